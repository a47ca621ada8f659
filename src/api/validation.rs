use actix_multipart::form::MultipartFormConfig;
use actix_web::{HttpResponse, error::JsonPayloadError, http::StatusCode, web};
use serde::Serialize;

/// Error body shared by every endpoint
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

/// Build an error response in the project's format
pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        fields: serde_json::json!({ "message": message.into() }),
    })
}

fn into_error(response: HttpResponse) -> actix_web::Error {
    actix_web::error::InternalError::from_response("", response).into()
}

/// JsonConfig for validated bodies, with the project's error format
pub fn json_config(limit: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| into_error(validation_error_response(err)))
}

/// QueryConfig for validated query strings, with the project's error format
pub fn query_config() -> actix_web_validator::QueryConfig {
    actix_web_validator::QueryConfig::default()
        .error_handler(|err, _req| into_error(validation_error_response(err)))
}

/// JsonConfig for bodies decoded without validation (bulk loads)
pub fn raw_json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| into_error(payload_error_response(err)))
}

/// PathConfig answering malformed ids with 400
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        into_error(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid path parameter",
            err.to_string(),
        ))
    })
}

/// MultipartFormConfig for uploads, with the project's error format
pub fn multipart_config(limit: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(limit)
        .error_handler(|err, _req| {
            into_error(error_response(StatusCode::BAD_REQUEST, "Invalid upload", err.to_string()))
        })
}

fn payload_error_response(err: JsonPayloadError) -> HttpResponse {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large", err.to_string())
        }
        JsonPayloadError::ContentType => error_response(
            StatusCode::BAD_REQUEST,
            "Request validation failed",
            "Expected Content-Type: application/json",
        ),
        other => {
            let err_string = other.to_string();
            let message = if err_string.contains("EOF while parsing") {
                "Request body is empty. Expected JSON payload".to_string()
            } else {
                format!("Invalid request format: {}", err_string)
            };
            error_response(StatusCode::BAD_REQUEST, "Request validation failed", message)
        }
    }
}

fn validation_error_response(err: actix_web_validator::Error) -> HttpResponse {
    match err {
        actix_web_validator::Error::Validate(validation_errors) => {
            let mut fields = serde_json::Map::new();
            for (field, errors) in validation_errors.field_errors() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation error in field: {}", field))
                    })
                    .collect();
                fields.insert(field.to_string(), serde_json::json!({"errors": messages}));
            }

            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                fields: serde_json::Value::Object(fields),
            })
        }
        actix_web_validator::Error::Deserialize(de_err) => {
            let err_string = de_err.to_string();

            let message = if err_string.contains("EOF while parsing") {
                "Request body is empty. Expected JSON payload".to_string()
            } else if err_string.contains("missing field") {
                format!("Missing required field: {}", err_string)
            } else {
                format!("Invalid request format: {}", err_string)
            };
            error_response(StatusCode::BAD_REQUEST, "Request validation failed", message)
        }
        actix_web_validator::Error::JsonPayloadError(payload_err) => payload_error_response(payload_err),
        other => error_response(StatusCode::BAD_REQUEST, "Validation failed", other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_payload_is_413() {
        let response = payload_error_response(JsonPayloadError::Overflow { limit: 16 });
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn wrong_content_type_is_400() {
        let response = payload_error_response(JsonPayloadError::ContentType);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
