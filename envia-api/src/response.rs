use serde::Serialize;

/// The envelope every data endpoint wraps its reply in. The frontend keys
/// off `header.status` plus whichever row counter the operation sets.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub header: Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Header {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<i32>,
    #[serde(rename = "insertedRows", skip_serializing_if = "Option::is_none")]
    pub inserted_rows: Option<u64>,
    #[serde(rename = "updatedRows", skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<u64>,
    #[serde(rename = "deletedRows", skip_serializing_if = "Option::is_none")]
    pub deleted_rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Header {
    fn ok() -> Self {
        Header {
            status: "ok",
            content: None,
            inserted_rows: None,
            updated_rows: None,
            deleted_rows: None,
            resource: None,
            count: None,
        }
    }
}

/// Non-empty result set.
pub fn success<T: Serialize>(payload: T) -> ApiResponse<T> {
    ApiResponse {
        header: Header {
            content: Some(1),
            ..Header::ok()
        },
        payload: Some(payload),
        message: None,
    }
}

/// Success envelope with an explicit content flag and optional message,
/// for endpoints whose payload shape varies by outcome.
pub fn success_with<T: Serialize>(
    payload: T,
    content: i32,
    message: Option<String>,
) -> ApiResponse<T> {
    ApiResponse {
        header: Header {
            content: Some(content),
            ..Header::ok()
        },
        payload: Some(payload),
        message,
    }
}

/// Non-empty listing tagged with the resource name and item count.
pub fn listing<T: Serialize>(payload: Vec<T>, resource: &'static str) -> ApiResponse<Vec<T>> {
    let count = payload.len();
    ApiResponse {
        header: Header {
            content: Some(1),
            resource: Some(resource),
            count: Some(count),
            ..Header::ok()
        },
        payload: Some(payload),
        message: None,
    }
}

/// Empty result set: payload stays an empty array so the frontend can
/// iterate unconditionally.
pub fn empty<T: Serialize>() -> ApiResponse<Vec<T>> {
    ApiResponse {
        header: Header {
            content: Some(0),
            ..Header::ok()
        },
        payload: Some(Vec::new()),
        message: None,
    }
}

/// Empty result set with a reason the caller should surface.
pub fn empty_with_message<T: Serialize>(message: impl Into<String>) -> ApiResponse<Vec<T>> {
    let mut response = empty();
    response.message = Some(message.into());
    response
}

pub fn created(rows_affected: u64) -> ApiResponse<()> {
    ApiResponse {
        header: Header {
            inserted_rows: Some(rows_affected),
            ..Header::ok()
        },
        payload: None,
        message: Some(if rows_affected > 0 {
            "record inserted".to_string()
        } else {
            "no record inserted".to_string()
        }),
    }
}

pub fn created_with_message(rows_affected: u64, message: impl Into<String>) -> ApiResponse<()> {
    let mut response = created(rows_affected);
    response.message = Some(message.into());
    response
}

pub fn updated(rows_affected: u64) -> ApiResponse<()> {
    ApiResponse {
        header: Header {
            updated_rows: Some(rows_affected),
            ..Header::ok()
        },
        payload: None,
        message: Some(if rows_affected > 0 {
            "record updated".to_string()
        } else {
            "no record updated".to_string()
        }),
    }
}

pub fn deleted(rows_affected: u64) -> ApiResponse<()> {
    ApiResponse {
        header: Header {
            deleted_rows: Some(rows_affected),
            ..Header::ok()
        },
        payload: None,
        message: Some(if rows_affected > 0 {
            "record deleted".to_string()
        } else {
            "no record deleted".to_string()
        }),
    }
}

pub fn deleted_with_message(rows_affected: u64, message: impl Into<String>) -> ApiResponse<()> {
    let mut response = deleted(rows_affected);
    response.message = Some(message.into());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_content_flag() {
        let json = serde_json::to_value(success(vec!["a", "b"])).unwrap();
        assert_eq!(json["header"]["status"], "ok");
        assert_eq!(json["header"]["content"], 1);
        assert_eq!(json["payload"].as_array().unwrap().len(), 2);
        assert!(json.get("message").is_none());
        assert!(json["header"].get("insertedRows").is_none());
    }

    #[test]
    fn listing_envelope_reports_resource_and_count() {
        let json = serde_json::to_value(listing(vec![1, 2, 3], "orderspending")).unwrap();
        assert_eq!(json["header"]["resource"], "orderspending");
        assert_eq!(json["header"]["count"], 3);
    }

    #[test]
    fn empty_envelope_keeps_an_iterable_payload() {
        let json = serde_json::to_value(empty_with_message::<String>("order already shipped")).unwrap();
        assert_eq!(json["header"]["content"], 0);
        assert_eq!(json["payload"].as_array().unwrap().len(), 0);
        assert_eq!(json["message"], "order already shipped");
    }

    #[test]
    fn mutation_envelopes_pick_their_counter_and_message() {
        let json = serde_json::to_value(created(1)).unwrap();
        assert_eq!(json["header"]["insertedRows"], 1);
        assert_eq!(json["message"], "record inserted");

        let json = serde_json::to_value(updated(0)).unwrap();
        assert_eq!(json["header"]["updatedRows"], 0);
        assert_eq!(json["message"], "no record updated");

        let json = serde_json::to_value(deleted(2)).unwrap();
        assert_eq!(json["header"]["deletedRows"], 2);
        assert_eq!(json["message"], "record deleted");
    }
}
