use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ImportError;

pub const ADMIN_USERS_PATH: &str = "auth/v1/admin/users";
pub const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// Status and raw body of a finished request. Non-2xx answers are not errors at
/// this level; callers decide what a failure means for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}

/// The two calls the import makes against the remote store.
pub trait RestApi {
    fn get(&self, path: &str) -> Result<ApiResponse, ImportError>;

    /// Bulk insert with merge-on-conflict and no response body.
    fn upsert(&self, table: &str, rows: &Value) -> Result<ApiResponse, ImportError>;
}

pub struct SupabaseClient {
    config: ApiConfig,
    http: Client,
}

impl SupabaseClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.config.service_key();
        request
            .header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
    }

    fn get_request(&self, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!("GET {}", url);
        self.authorized(self.http.get(url))
    }

    fn upsert_request(&self, table: &str, rows: &Value) -> RequestBuilder {
        let url = self.config.url(&format!("rest/v1/{}", table));
        debug!("POST {}", url);
        self.authorized(self.http.post(url))
            .header("Content-Type", "application/json")
            .header("Prefer", UPSERT_PREFERENCE)
            .json(rows)
    }
}

fn into_response(response: reqwest::blocking::Response) -> Result<ApiResponse, ImportError> {
    let status = response.status().as_u16();
    let body = response.text()?;
    Ok(ApiResponse { status, body })
}

impl RestApi for SupabaseClient {
    fn get(&self, path: &str) -> Result<ApiResponse, ImportError> {
        into_response(self.get_request(path).send()?)
    }

    fn upsert(&self, table: &str, rows: &Value) -> Result<ApiResponse, ImportError> {
        into_response(self.upsert_request(table, rows).send()?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;

    fn client() -> SupabaseClient {
        SupabaseClient::new(ApiConfig::new(
            "https://example.supabase.co/",
            SecretString::from("service-key".to_string()),
        ))
    }

    #[test]
    fn upsert_request_carries_credentials_and_merge_preference() {
        let rows = json!([{ "date": "2024-01-03", "temperature": 36.5, "user_id": "u-1" }]);
        let request = client()
            .upsert_request("temperature_entries", &rows)
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://example.supabase.co/rest/v1/temperature_entries"
        );
        let headers = request.headers();
        assert_eq!(headers["apikey"], "service-key");
        assert_eq!(headers["authorization"], "Bearer service-key");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(
            headers["prefer"],
            "resolution=merge-duplicates,return=minimal"
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, rows);
    }

    #[test]
    fn admin_listing_request_is_authorized() {
        let request = client().get_request(ADMIN_USERS_PATH).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://example.supabase.co/auth/v1/admin/users"
        );
        assert_eq!(request.headers()["apikey"], "service-key");
        assert_eq!(request.headers()["authorization"], "Bearer service-key");
        assert!(request.headers().get("prefer").is_none());
    }

    #[test]
    fn success_means_below_300() {
        let ok = |status| ApiResponse {
            status,
            body: String::new(),
        }
        .is_success();
        assert!(ok(200));
        assert!(ok(201));
        assert!(ok(204));
        assert!(!ok(300));
        assert!(!ok(401));
        assert!(!ok(409));
    }
}
