use serde_json::{json, Value};
use stockhub_inventory::{parse_item_id, InventoryError, ItemId};
use stockhub_job_queue::JobRun;

use crate::error::ApiError;

pub fn parse_positive_usize(
    raw: Option<&String>,
    fallback: usize,
    field: &str,
) -> Result<usize, ApiError> {
    match raw {
        Some(value) => {
            let parsed = value.parse::<usize>().map_err(|_| {
                ApiError::bad_request(format!("{field} must be a positive integer"))
            })?;
            if parsed == 0 {
                return Err(ApiError::bad_request(format!("{field} must be at least 1")));
            }
            Ok(parsed)
        }
        None => Ok(fallback),
    }
}

/// Parse an `itemId` path segment. Zero, negative and non-numeric ids are
/// rejected; numeric ids too large for any item are not found.
pub fn parse_item_id_param(raw: &str) -> Result<ItemId, ApiError> {
    parse_item_id(raw).map_err(|e| match e {
        InventoryError::UnknownProductId(_) => ApiError::ProductNotFound,
        _ => ApiError::InvalidProductId,
    })
}

pub fn job_run_to_payload(run: &JobRun) -> Value {
    json!({
        "id": run.id,
        "jobType": run.job_type,
        "status": run.status.to_string(),
        "progress": run.progress,
        "enqueuedAt": run.enqueued_at.to_rfc3339(),
        "startedAt": run.started_at.map(|dt| dt.to_rfc3339()),
        "finishedAt": run.finished_at.map(|dt| dt.to_rfc3339()),
        "errorMessage": run.error_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_usize_defaults_and_rejects_zero() {
        assert_eq!(parse_positive_usize(None, 20, "perPage").unwrap(), 20);
        assert_eq!(
            parse_positive_usize(Some(&"3".to_string()), 1, "page").unwrap(),
            3
        );
        assert!(parse_positive_usize(Some(&"0".to_string()), 1, "page").is_err());
        assert!(parse_positive_usize(Some(&"x".to_string()), 1, "page").is_err());
    }

    #[test]
    fn item_id_param_maps_to_invalid_product() {
        assert_eq!(parse_item_id_param("4").unwrap(), 4);
        for raw in ["0", "-1", "abc", ""] {
            assert!(matches!(
                parse_item_id_param(raw),
                Err(ApiError::InvalidProductId)
            ));
        }
        assert!(matches!(
            parse_item_id_param("4294967296"),
            Err(ApiError::ProductNotFound)
        ));
    }
}
