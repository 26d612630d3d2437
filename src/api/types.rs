//! Shared request and response types for REST API handlers.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{ClaimProof, ClaimRecord, NewClaim};
use crate::infra::{GatewayError, Result};

// ============================================================================
// Claim types
// ============================================================================

/// Fields a claim filing must carry.
pub const REQUIRED_CLAIM_FIELDS: [&str; 5] = ["userId", "crop", "event", "amount", "description"];

/// Validate a claim filing body.
///
/// Absent or `null` fields are reported as missing before any type check so
/// clients always learn about every omission first.
pub fn parse_new_claim(body: &Value) -> Result<NewClaim> {
    let object = body
        .as_object()
        .ok_or_else(|| GatewayError::Validation("request body must be a JSON object".into()))?;

    if let Some(missing) = REQUIRED_CLAIM_FIELDS
        .iter()
        .find(|field| object.get(**field).map_or(true, Value::is_null))
    {
        return Err(GatewayError::MissingField((*missing).to_string()));
    }

    Ok(NewClaim {
        user_id: string_field(object, "userId")?,
        crop: string_field(object, "crop")?,
        event: string_field(object, "event")?,
        amount: object["amount"].clone(),
        description: string_field(object, "description")?,
    })
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Validation(format!("{} must be a string", field)))
}

/// Response for a filed claim.
#[derive(Debug, Serialize)]
pub struct FileClaimResponse {
    pub success: bool,
    pub data: ClaimRecord,
    pub message: &'static str,
}

/// Response listing a user's claims.
#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub success: bool,
    pub data: ClaimList,
}

#[derive(Debug, Serialize)]
pub struct ClaimList {
    pub claims: Vec<ClaimRecord>,
}

/// Response carrying a claim's proof details.
#[derive(Debug, Serialize)]
pub struct ClaimProofResponse {
    pub success: bool,
    pub data: ClaimProof,
}

// ============================================================================
// Raw proof types
// ============================================================================

/// Validated body of `POST /api/store-proof`.
#[derive(Debug, Clone)]
pub struct StoreProofRequest {
    pub data: Value,
    pub metadata: String,
}

/// Parse a store-proof body. An empty `data` (`null`, `false`, zero, `""`,
/// `[]` or `{}`) counts as missing.
pub fn parse_store_proof(body: &Value) -> Result<StoreProofRequest> {
    let data = match body.get("data") {
        Some(data) if !is_empty_value(data) => data.clone(),
        _ => return Err(GatewayError::MissingField("data".to_string())),
    };

    let metadata = match body.get("metadata") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(metadata)) => metadata.clone(),
        Some(_) => {
            return Err(GatewayError::Validation(
                "metadata must be a string".to_string(),
            ))
        }
    };

    Ok(StoreProofRequest { data, metadata })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// `202 Accepted` body for a broadcast proof.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSubmittedResponse {
    pub message: &'static str,
    pub tx_hash: String,
    pub data_hash: String,
}

/// `200 OK` body for a digest already on chain.
#[derive(Debug, Serialize)]
pub struct ProofExistsResponse {
    pub message: &'static str,
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim_body() -> Value {
        json!({
            "userId": "FARMER123",
            "crop": "rice",
            "event": "flood",
            "amount": "25000",
            "description": "Paddy submerged for four days"
        })
    }

    #[test]
    fn test_parse_new_claim() {
        let claim = parse_new_claim(&claim_body()).unwrap();
        assert_eq!(claim.user_id, "FARMER123");
        assert_eq!(claim.amount, json!("25000"));
    }

    #[test]
    fn test_each_required_field_is_checked() {
        for field in REQUIRED_CLAIM_FIELDS {
            let mut body = claim_body();
            body.as_object_mut().unwrap().remove(field);
            assert_eq!(
                parse_new_claim(&body).unwrap_err(),
                GatewayError::MissingField(field.to_string())
            );

            let mut body = claim_body();
            body[field] = Value::Null;
            assert_eq!(
                parse_new_claim(&body).unwrap_err(),
                GatewayError::MissingField(field.to_string())
            );
        }
    }

    #[test]
    fn test_non_string_fields_are_rejected() {
        let mut body = claim_body();
        body["crop"] = json!(42);
        assert!(matches!(
            parse_new_claim(&body),
            Err(GatewayError::Validation(_))
        ));

        assert!(matches!(
            parse_new_claim(&json!(["not", "an", "object"])),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_store_proof() {
        let request =
            parse_store_proof(&json!({"data": {"sensorId": "A1"}, "metadata": "m"})).unwrap();
        assert_eq!(request.metadata, "m");

        let request = parse_store_proof(&json!({"data": [1, 2]})).unwrap();
        assert_eq!(request.metadata, "");

        assert_eq!(
            parse_store_proof(&json!({"metadata": "m"})).unwrap_err(),
            GatewayError::MissingField("data".to_string())
        );
        assert_eq!(
            parse_store_proof(&json!({"data": null})).unwrap_err(),
            GatewayError::MissingField("data".to_string())
        );
        assert!(matches!(
            parse_store_proof(&json!({"data": 1, "metadata": 7})),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_data_counts_as_missing() {
        for data in [json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert_eq!(
                parse_store_proof(&json!({ "data": data })).unwrap_err(),
                GatewayError::MissingField("data".to_string())
            );
        }

        for data in [json!(true), json!(-1), json!("0"), json!([0]), json!({"a": null})] {
            assert!(parse_store_proof(&json!({ "data": data })).is_ok());
        }
    }
}
