// Listing store backed by Google Cloud Firestore, reached through its REST API.

use super::ListingStore;
use crate::{config::Settings, models::Listing};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;
use yup_oauth2::{AccessToken, ServiceAccountAuthenticator, ServiceAccountKey};

const FIRESTORE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/datastore", // Firestore scope
    "https://www.googleapis.com/auth/cloud-platform", // General cloud scope
];
const LIST_PAGE_SIZE: &str = "300";

pub struct FirestoreStore {
    http: Client,
    documents_url: String,
    credentials: Option<ServiceAccountKey>,
    token: Mutex<Option<AccessToken>>,
}

// --- Firestore Response Structures ---

#[derive(Deserialize, Debug)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    documents: Option<Vec<FirestoreDocument>>,
    next_page_token: Option<String>,
}

impl FirestoreStore {
    // Reads the service-account key when one is configured. Without it requests go
    // out unauthenticated, which is what the local Firestore emulator expects.
    pub async fn new(settings: &Settings, http: Client) -> Result<Self> {
        let project_id = settings
            .firebase_project_id
            .as_deref()
            .ok_or_else(|| anyhow!("Firebase project ID not configured"))?;

        let credentials = match settings.google_application_credentials.as_deref() {
            Some(path) => Some(
                yup_oauth2::read_service_account_key(path)
                    .await
                    .context("Failed to read service account key file")?,
            ),
            None => {
                tracing::warn!("No service account configured, Firestore requests will be unauthenticated.");
                None
            }
        };

        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            settings.firestore_base_url.trim_end_matches('/'),
            project_id,
            settings.firestore_collection
        );
        tracing::info!("Using Firestore collection at {}", documents_url);

        Ok(Self { http, documents_url, credentials, token: Mutex::new(None) })
    }

    // Reuses the cached OAuth2 token until it expires.
    async fn bearer_token(&self) -> Result<Option<String>> {
        let Some(key) = &self.credentials else {
            return Ok(None);
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            if let Some(value) = token.token() {
                return Ok(Some(value.to_string()));
            }
        }

        let auth = ServiceAccountAuthenticator::builder(key.clone())
            .build()
            .await
            .context("Failed to create service account authenticator")?;
        let token = auth.token(&FIRESTORE_SCOPES).await.context("Failed to get OAuth2 token")?;
        let value = token
            .token()
            .ok_or_else(|| anyhow!("Token string is empty"))?
            .to_string();
        *cached = Some(token);
        Ok(Some(value))
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let builder = self.http.request(method, url);
        Ok(match self.bearer_token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.documents_url, id)
    }

    async fn create_document(&self, id: &str, body: &Value) -> Result<Option<FirestoreDocument>> {
        let response = self
            .request(Method::POST, &self.documents_url)
            .await?
            .query(&[("documentId", id)])
            .json(body)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(None);
        }
        let doc = response
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse response after creating listing document")?;
        Ok(Some(doc))
    }
}

#[async_trait]
impl ListingStore for FirestoreStore {
    async fn list(&self) -> Result<Vec<Listing>> {
        let mut listings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &self.documents_url)
                .await?
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListDocumentsResponse = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
                .context("Failed to parse list documents response from Firestore")?;

            for doc in page.documents.unwrap_or_default() {
                match document_to_listing(&doc) {
                    Ok(listing) => listings.push(listing),
                    // A broken document should not take the whole catalog down
                    Err(e) => tracing::warn!("Skipping unreadable listing document {}: {:#}", doc.name, e),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Loaded {} listings from Firestore", listings.len());
        Ok(listings)
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>> {
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        let response = self.request(Method::GET, &self.document_url(id)).await?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: FirestoreDocument = response
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse listing document response from Firestore")?;
        document_to_listing(&doc).map(Some)
    }

    async fn insert(&self, mut listing: Listing) -> Result<Listing> {
        if !is_valid_document_id(&listing.id) {
            listing.id = Uuid::new_v4().simple().to_string();
        }
        let body = listing_to_document(&listing)?;

        let created = match self.create_document(&listing.id, &body).await? {
            Some(doc) => doc,
            None => {
                // Id already taken, e.g. re-seeding sample ids
                listing.id = Uuid::new_v4().simple().to_string();
                self.create_document(&listing.id, &body)
                    .await?
                    .ok_or_else(|| anyhow!("Firestore rejected generated document id {}", listing.id))?
            }
        };

        let stored = document_to_listing(&created)?;
        tracing::info!("Successfully saved listing with ID: {}", stored.id);
        Ok(stored)
    }

    async fn replace(&self, listing: Listing) -> Result<Option<Listing>> {
        if !is_valid_document_id(&listing.id) {
            return Ok(None);
        }
        let body = listing_to_document(&listing)?;
        let response = self
            .request(Method::PATCH, &self.document_url(&listing.id))
            .await?
            .query(&[("currentDocument.exists", "true")])
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: FirestoreDocument = response
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse response after updating listing document")?;
        document_to_listing(&doc).map(Some)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if !is_valid_document_id(id) {
            return Ok(false);
        }
        let response = self
            .request(Method::DELETE, &self.document_url(id))
            .await?
            .query(&[("currentDocument.exists", "true")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }
}

// Ids are used verbatim as path segments, so keep them to a safe alphabet.
fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 128 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// Helper to extract document ID from the full name path
fn extract_doc_id(name: &str) -> Option<String> {
    name.rsplit('/').next().filter(|s| !s.is_empty()).map(|s| s.to_string())
}

// --- Firestore Serialization Helpers ---

fn listing_to_document(listing: &Listing) -> Result<Value> {
    let Value::Object(mut map) = serde_json::to_value(listing).context("Failed to serialize listing")? else {
        return Err(anyhow!("Listing did not serialize to an object"));
    };
    map.remove("_id"); // Carried by the document name
    Ok(json!({ "fields": to_firestore_fields(&map) }))
}

fn document_to_listing(doc: &FirestoreDocument) -> Result<Listing> {
    let id = extract_doc_id(&doc.name).ok_or_else(|| anyhow!("Could not extract document ID from {}", doc.name))?;
    let mut map = from_firestore_fields(&doc.fields);
    map.insert("_id".to_string(), Value::String(id));
    serde_json::from_value(Value::Object(map)).with_context(|| format!("Listing document {} has unexpected shape", doc.name))
}

fn to_firestore_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), to_firestore_value(v))).collect()
}

fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }), // Firestore integers travel as strings
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

fn from_firestore_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields.iter().map(|(k, v)| (k.clone(), from_firestore_value(v))).collect()
}

fn from_firestore_value(value: &Value) -> Value {
    let Some(typed) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = typed.get("stringValue").or_else(|| typed.get("timestampValue")) {
        return s.clone();
    }
    if let Some(i) = typed.get("integerValue") {
        return match i {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(v) = typed.get("doubleValue").or_else(|| typed.get("booleanValue")) {
        return v.clone();
    }
    if let Some(array) = typed.get("arrayValue") {
        // Empty arrays come back without a "values" key
        let items = array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(from_firestore_value).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(map) = typed.get("mapValue") {
        let fields = map.get("fields").and_then(Value::as_object).cloned().unwrap_or_default();
        return Value::Object(from_firestore_fields(&fields));
    }
    Value::Null
}
