use std::sync::OnceLock;

use serde::Deserialize;

use crate::state::{CatalogEntry, DetailRecord, PendingDetail};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";
pub const CATALOG_LIMIT: usize = 151;
pub const DESCRIPTION_LANGUAGE: &str = "en";

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
    #[error("response parse error: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct CatalogResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct CatalogResponse {
    results: Vec<CatalogResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    sprites: serde_json::Value,
    types: Vec<PokemonTypeSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

pub fn catalog_url(api_base: &str) -> String {
    format!("{}/pokemon?limit={CATALOG_LIMIT}", api_base.trim_end_matches('/'))
}

pub fn species_url(api_base: &str, id: u32) -> String {
    format!("{}/pokemon-species/{id}/", api_base.trim_end_matches('/'))
}

pub async fn fetch_catalog(api_base: &str) -> Result<Vec<CatalogEntry>, FetchError> {
    let bytes = fetch_bytes(&catalog_url(api_base)).await?;
    parse_catalog(&bytes)
}

/// Fetch one entry's record. The result still lacks its description.
pub async fn fetch_detail(url: &str) -> Result<PendingDetail, FetchError> {
    let bytes = fetch_bytes(url).await?;
    parse_detail(&bytes)
}

pub async fn fetch_description(
    api_base: &str,
    detail: PendingDetail,
) -> Result<DetailRecord, FetchError> {
    let bytes = fetch_bytes(&species_url(api_base, detail.id)).await?;
    compose_record(detail, &bytes)
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(%url, "GET");
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| FetchError::Request(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| FetchError::Request(err.to_string()))?
        .to_vec();
    Ok(bytes)
}

pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<CatalogEntry>, FetchError> {
    let response: CatalogResponse = decode(bytes)?;
    Ok(response
        .results
        .into_iter()
        .map(|entry| CatalogEntry {
            name: entry.name,
            url: entry.url,
        })
        .collect())
}

pub fn parse_detail(bytes: &[u8]) -> Result<PendingDetail, FetchError> {
    let response: PokemonResponse = decode(bytes)?;
    let types = response
        .types
        .into_iter()
        .map(|slot| slot.type_info.name)
        .collect();
    // front_default is null for some forms
    let image_url = pointer_string(&response.sprites, "/front_default").unwrap_or_default();
    Ok(PendingDetail {
        id: response.id,
        name: response.name,
        image_url,
        types,
    })
}

/// Attach the first English flavor text from a species payload.
pub fn compose_record(detail: PendingDetail, species: &[u8]) -> Result<DetailRecord, FetchError> {
    let response: SpeciesResponse = decode(species)?;
    let description = response
        .flavor_text_entries
        .into_iter()
        .find(|entry| entry.language.name == DESCRIPTION_LANGUAGE)
        .map(|entry| entry.flavor_text)
        .unwrap_or_default();
    Ok(detail.with_description(description))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(bytes).map_err(|err| FetchError::Parse(err.to_string()))
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}
