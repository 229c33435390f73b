//! ============================================================================
//! Shop API - JSON request routing
//! ============================================================================
//! Routes:
//! - /auth            POST {action: register | login | logout}
//! - /shop            GET catalog, POST {playerId, itemId} purchase
//! - /shop/inventory  GET ?playerId=N
//! - /health          GET
//!
//! Every response is JSON with permissive CORS; OPTIONS on a known path is a
//! bare preflight answer. Routing is transport independent; `server` adapts
//! it to tiny_http.
//! ============================================================================

pub mod server;

pub use server::{ApiServer, ShutdownHandle};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::auth::{parse_bearer, AuthService};
use crate::config::ServerConfig;
use crate::db::Store;
use crate::error::{ShopError, ShopResult};
use crate::shop::PurchaseEngine;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// HTTP method of an incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other(String),
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
            Method::Other(m) => m,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-independent request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    /// Build from a method and a raw request target (`/path?query`)
    pub fn new(method: Method, target: &str) -> ShopResult<Self> {
        let parsed = url::Url::parse(&format!("http://localhost{}", target))
            .map_err(|e| ShopError::validation(format!("Malformed request target: {}", e)))?;

        let path = match parsed.path().trim_end_matches('/') {
            "" => "/".to_string(),
            p => p.to_string(),
        };
        let query = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self {
            method,
            path,
            query,
            authorization: None,
            body: Vec::new(),
        })
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Decode the JSON body; an empty body reads as `{}`
    fn json<T: DeserializeOwned>(&self) -> ShopResult<T> {
        let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &self.body
        };
        serde_json::from_slice(bytes)
            .map_err(|e| ShopError::validation(format!("Invalid JSON body: {}", e)))
    }
}

/// Transport-independent response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("Access-Control-Allow-Origin", "*".to_string()),
            ],
            body: value.to_string(),
        }
    }

    pub fn ok(value: &Value) -> Self {
        Self::json(200, value)
    }

    /// `{error, code}` body
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::json(status, &json!({ "error": message, "code": code }))
    }

    pub fn from_error(err: &ShopError) -> Self {
        if err.is_internal() {
            error!("Internal error: {}", err);
            return Self::error(err.status_code(), err.code(), "Internal server error");
        }
        Self::error(err.status_code(), err.code(), &err.to_string())
    }

    /// CORS preflight answer
    pub fn preflight() -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Access-Control-Allow-Origin", "*".to_string()),
                ("Access-Control-Allow-Methods", ALLOW_METHODS.to_string()),
                ("Access-Control-Allow-Headers", ALLOW_HEADERS.to_string()),
                ("Access-Control-Max-Age", PREFLIGHT_MAX_AGE.to_string()),
            ],
            body: String::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthBody {
    action: Option<String>,
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PurchaseBody {
    player_id: Option<Value>,
    item_id: Option<Value>,
}

/// Accept ids as JSON numbers or numeric strings
fn parse_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Auth,
    Shop,
    Inventory,
    Health,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/auth" => Some(Route::Auth),
            "/shop" => Some(Route::Shop),
            "/shop/inventory" => Some(Route::Inventory),
            "/health" => Some(Route::Health),
            _ => None,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// The game backend's JSON API
pub struct ShopApi {
    store: Arc<Store>,
    auth: AuthService,
    shop: PurchaseEngine,
    require_token: bool,
    max_body_bytes: usize,
}

impl ShopApi {
    pub fn new(store: Arc<Store>, config: &ServerConfig) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&store), config),
            shop: PurchaseEngine::new(Arc::clone(&store), config),
            store,
            require_token: config.require_token,
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Route a request; never fails, errors become JSON responses
    pub fn handle(&self, req: &ApiRequest) -> ApiResponse {
        let response = match self.dispatch(req) {
            Ok(response) => response,
            Err(e) => ApiResponse::from_error(&e),
        };

        if (400..500).contains(&response.status) {
            warn!("{} {} -> {}", req.method, req.path, response.status);
        } else {
            debug!("{} {} -> {}", req.method, req.path, response.status);
        }
        response
    }

    fn dispatch(&self, req: &ApiRequest) -> ShopResult<ApiResponse> {
        let route = match Route::from_path(&req.path) {
            Some(route) => route,
            None => return Ok(ApiResponse::error(404, "not_found", "Not found")),
        };

        if req.method == Method::Options {
            return Ok(ApiResponse::preflight());
        }
        if req.body.len() > self.max_body_bytes {
            return Ok(ApiResponse::error(
                413,
                "payload_too_large",
                "Request body too large",
            ));
        }

        match (route, &req.method) {
            (Route::Auth, Method::Get | Method::Post) => self.handle_auth(req),
            (Route::Shop, Method::Get) => self.list_items(),
            (Route::Shop, Method::Post) => self.purchase(req),
            (Route::Inventory, Method::Get) => self.inventory(req),
            (Route::Health, Method::Get) => Ok(ApiResponse::ok(&json!({ "status": "ok" }))),
            _ => {
                let mut response =
                    ApiResponse::error(405, "method_not_allowed", "Method not allowed");
                response.headers.push(("Allow", ALLOW_METHODS.to_string()));
                Ok(response)
            }
        }
    }

    // ========================================================================
    // /auth
    // ========================================================================

    fn handle_auth(&self, req: &ApiRequest) -> ShopResult<ApiResponse> {
        let body: AuthBody = req.json()?;
        let field = |v: &Option<String>| v.clone().unwrap_or_default();

        match body.action.as_deref() {
            Some("register") => {
                let session = self.auth.register(
                    &field(&body.username),
                    &field(&body.password),
                    &field(&body.email),
                    body.avatar.as_deref(),
                )?;
                Ok(ApiResponse::ok(&serde_json::to_value(&session)?))
            }
            Some("login") => {
                let session = self
                    .auth
                    .login(&field(&body.username), &field(&body.password))?;
                Ok(ApiResponse::ok(&serde_json::to_value(&session)?))
            }
            Some("logout") => {
                let token = req
                    .authorization
                    .as_deref()
                    .and_then(parse_bearer)
                    .map(str::to_string)
                    .or(body.token)
                    .ok_or_else(|| ShopError::Unauthorized("missing token".into()))?;
                self.auth.logout(&token)?;
                Ok(ApiResponse::ok(&json!({ "success": true })))
            }
            _ => Ok(ApiResponse::error(400, "validation", "Unknown action")),
        }
    }

    // ========================================================================
    // /shop
    // ========================================================================

    fn list_items(&self) -> ShopResult<ApiResponse> {
        let items = self.store.list_items()?;
        Ok(ApiResponse::ok(&json!({ "items": items })))
    }

    fn purchase(&self, req: &ApiRequest) -> ShopResult<ApiResponse> {
        let body: PurchaseBody = req.json()?;
        let (player_id, item_id) = match (
            parse_id(body.player_id.as_ref()),
            parse_id(body.item_id.as_ref()),
        ) {
            (Some(p), Some(i)) => (p, i),
            _ => return Err(ShopError::validation("playerId and itemId are required")),
        };

        self.authorize(req, player_id)?;

        let receipt = self.shop.purchase(player_id, item_id)?;
        Ok(ApiResponse::ok(&json!({
            "success": true,
            "coins": receipt.coins,
            "gems": receipt.gems,
            "attack": receipt.attack,
            "defense": receipt.defense,
            "maxHealth": receipt.max_health,
        })))
    }

    /// A bearer token, when present, must belong to the purchasing player
    fn authorize(&self, req: &ApiRequest, player_id: u64) -> ShopResult<()> {
        let header = match req.authorization.as_deref() {
            Some(h) => h,
            None if self.require_token => {
                return Err(ShopError::Unauthorized("missing token".into()))
            }
            None => return Ok(()),
        };

        let token = parse_bearer(header)
            .ok_or_else(|| ShopError::Unauthorized("malformed authorization header".into()))?;
        let owner = self.auth.validate_token(token)?;
        if owner != player_id {
            return Err(ShopError::Forbidden(
                "token does not belong to this player".into(),
            ));
        }
        Ok(())
    }

    fn inventory(&self, req: &ApiRequest) -> ShopResult<ApiResponse> {
        let player_id = req
            .query
            .get("playerId")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| ShopError::validation("playerId is required"))?;

        let items = self.shop.inventory(player_id)?;
        Ok(ApiResponse::ok(&json!({ "items": items })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_with(config: ServerConfig) -> ShopApi {
        let store = Arc::new(Store::in_memory().unwrap());
        ShopApi::new(store, &config)
    }

    fn api() -> ShopApi {
        api_with(ServerConfig::default())
    }

    fn post(path: &str, body: Value) -> ApiRequest {
        ApiRequest::new(Method::Post, path)
            .unwrap()
            .with_body(body.to_string())
    }

    fn get(target: &str) -> ApiRequest {
        ApiRequest::new(Method::Get, target).unwrap()
    }

    fn body(resp: &ApiResponse) -> Value {
        serde_json::from_str(&resp.body).unwrap()
    }

    fn register(api: &ShopApi, name: &str) -> (u64, String) {
        let resp = api.handle(&post(
            "/auth",
            json!({
                "action": "register",
                "username": name,
                "password": "secret",
                "email": format!("{}@example.com", name),
            }),
        ));
        assert_eq!(resp.status, 200, "{}", resp.body);
        let json = body(&resp);
        (
            json["player"]["id"].as_u64().unwrap(),
            json["token"].as_str().unwrap().to_string(),
        )
    }

    fn item_id(api: &ShopApi, name: &str) -> u64 {
        let listing = body(&api.handle(&get("/shop")));
        listing["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["name"] == name)
            .and_then(|i| i["id"].as_u64())
            .unwrap()
    }

    #[test]
    fn test_register_response_shape() {
        let api = api();
        let resp = api.handle(&post(
            "/auth",
            json!({
                "action": "register",
                "username": "ayla",
                "password": "secret",
                "email": "ayla@example.com",
                "avatar": "🐉",
            }),
        ));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));

        let json = body(&resp);
        assert!(json["token"].is_string());
        let player = &json["player"];
        assert_eq!(player["username"], "ayla");
        assert_eq!(player["avatar"], "🐉");
        assert_eq!(player["maxHealth"], 100);
        assert!(player.get("passwordHash").is_none());
        assert!(player.get("email").is_none());
    }

    #[test]
    fn test_register_blank_and_duplicate() {
        let api = api();
        let blank = api.handle(&post(
            "/auth",
            json!({"action": "register", "username": " ", "password": "x", "email": "a@b.c"}),
        ));
        assert_eq!(blank.status, 400);
        assert_eq!(body(&blank)["code"], "validation");

        register(&api, "ayla");
        let dup = api.handle(&post(
            "/auth",
            json!({"action": "register", "username": "ayla", "password": "x", "email": "z@b.c"}),
        ));
        assert_eq!(dup.status, 409);
        assert_eq!(body(&dup)["code"], "conflict");
    }

    #[test]
    fn test_login_failures_share_shape() {
        let api = api();
        register(&api, "ayla");

        let wrong = api.handle(&post(
            "/auth",
            json!({"action": "login", "username": "ayla", "password": "nope"}),
        ));
        let unknown = api.handle(&post(
            "/auth",
            json!({"action": "login", "username": "ghost", "password": "secret"}),
        ));
        assert_eq!(wrong.status, 401);
        assert_eq!(wrong, unknown);

        let ok = api.handle(&post(
            "/auth",
            json!({"action": "login", "username": "ayla", "password": "secret"}),
        ));
        assert_eq!(ok.status, 200);
    }

    #[test]
    fn test_unknown_action_and_get_auth() {
        let api = api();
        let resp = api.handle(&post("/auth", json!({"action": "dance"})));
        assert_eq!(resp.status, 400);
        assert_eq!(body(&resp)["error"], "Unknown action");

        let resp = api.handle(&get("/auth"));
        assert_eq!(resp.status, 400);
        assert_eq!(body(&resp)["error"], "Unknown action");
    }

    #[test]
    fn test_invalid_json_is_validation_error() {
        let api = api();
        let req = ApiRequest::new(Method::Post, "/auth")
            .unwrap()
            .with_body("{not json");
        let resp = api.handle(&req);
        assert_eq!(resp.status, 400);
        assert_eq!(body(&resp)["code"], "validation");
    }

    #[test]
    fn test_logout_revokes_token() {
        let api = api();
        let (_, token) = register(&api, "ayla");

        let req = post("/auth", json!({"action": "logout"}))
            .with_authorization(format!("Bearer {}", token));
        let resp = api.handle(&req);
        assert_eq!(resp.status, 200);
        assert_eq!(body(&resp)["success"], true);

        let again = api.handle(&post("/auth", json!({"action": "logout", "token": token})));
        assert_eq!(again.status, 401);
    }

    #[test]
    fn test_listing_items() {
        let api = api();
        let resp = api.handle(&get("/shop"));
        assert_eq!(resp.status, 200);
        let items = body(&resp)["items"].as_array().unwrap().clone();
        assert_eq!(items.len(), crate::catalog::CATALOG.len());
        assert_eq!(items[0]["rarity"], "common");
        assert!(items[0].get("priceCoins").is_some());
    }

    #[test]
    fn test_purchase_flow() {
        let api = api();
        let (pid, _) = register(&api, "ayla");
        let sword = item_id(&api, "Wooden Sword");

        let resp = api.handle(&post(
            "/shop",
            json!({"playerId": pid.to_string(), "itemId": sword}),
        ));
        assert_eq!(resp.status, 200, "{}", resp.body);
        let json = body(&resp);
        assert_eq!(json["success"], true);
        assert_eq!(json["coins"], 50);
        assert_eq!(json["attack"], 15);
        assert_eq!(json["maxHealth"], 100);

        let inv = api.handle(&get(&format!("/shop/inventory?playerId={}", pid)));
        assert_eq!(inv.status, 200);
        let items = body(&inv)["items"].as_array().unwrap().clone();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Wooden Sword");
        assert_eq!(items[0]["quantity"], 1);
    }

    #[test]
    fn test_purchase_errors() {
        let api = api();
        let (pid, _) = register(&api, "ayla");
        let flame = item_id(&api, "Flame Sword");
        let steel = item_id(&api, "Steel Sword");

        let missing = api.handle(&post("/shop", json!({"playerId": pid})));
        assert_eq!(missing.status, 400);

        let gems = api.handle(&post("/shop", json!({"playerId": pid, "itemId": flame})));
        assert_eq!(gems.status, 400);
        assert_eq!(body(&gems)["code"], "insufficient_gems");

        let coins = api.handle(&post("/shop", json!({"playerId": pid, "itemId": steel})));
        assert_eq!(body(&coins)["code"], "insufficient_coins");

        let no_player = api.handle(&post("/shop", json!({"playerId": 999, "itemId": steel})));
        assert_eq!(no_player.status, 404);
        let no_item = api.handle(&post("/shop", json!({"playerId": pid, "itemId": 99_999})));
        assert_eq!(no_item.status, 404);
        assert_eq!(body(&no_item)["error"], "item not found");
    }

    #[test]
    fn test_purchase_bearer_checks() {
        let api = api();
        let (ayla, ayla_token) = register(&api, "ayla");
        let (bren, _) = register(&api, "bren");
        let sword = item_id(&api, "Wooden Sword");

        let foreign = post("/shop", json!({"playerId": bren, "itemId": sword}))
            .with_authorization(format!("Bearer {}", ayla_token));
        assert_eq!(api.handle(&foreign).status, 403);

        let bogus = post("/shop", json!({"playerId": ayla, "itemId": sword}))
            .with_authorization("Bearer not-a-token");
        assert_eq!(api.handle(&bogus).status, 401);

        let own = post("/shop", json!({"playerId": ayla, "itemId": sword}))
            .with_authorization(format!("Bearer {}", ayla_token));
        assert_eq!(api.handle(&own).status, 200);
    }

    #[test]
    fn test_require_token_mode() {
        let api = api_with(ServerConfig {
            require_token: true,
            ..ServerConfig::default()
        });
        let (pid, token) = register(&api, "ayla");
        let sword = item_id(&api, "Wooden Sword");

        let anonymous = api.handle(&post("/shop", json!({"playerId": pid, "itemId": sword})));
        assert_eq!(anonymous.status, 401);

        let signed = post("/shop", json!({"playerId": pid, "itemId": sword}))
            .with_authorization(format!("Bearer {}", token));
        assert_eq!(api.handle(&signed).status, 200);
    }

    #[test]
    fn test_preflight_and_routing() {
        let api = api();
        for path in ["/auth", "/shop"] {
            let resp = api.handle(&ApiRequest::new(Method::Options, path).unwrap());
            assert_eq!(resp.status, 200);
            assert!(resp.body.is_empty());
            assert_eq!(resp.header("Access-Control-Max-Age"), Some("86400"));
            assert_eq!(
                resp.header("Access-Control-Allow-Methods"),
                Some("GET, POST, OPTIONS")
            );
        }

        let missing = api.handle(&get("/nowhere"));
        assert_eq!(missing.status, 404);
        assert_eq!(body(&missing)["code"], "not_found");

        let delete = api.handle(&ApiRequest::new(Method::parse("delete"), "/shop").unwrap());
        assert_eq!(delete.status, 405);

        let health = api.handle(&get("/health/"));
        assert_eq!(body(&health)["status"], "ok");
    }

    #[test]
    fn test_oversized_body_rejected() {
        let api = api_with(ServerConfig {
            max_body_bytes: 16,
            ..ServerConfig::default()
        });
        let resp = api.handle(&post("/auth", json!({"action": "login", "username": "a-long-name"})));
        assert_eq!(resp.status, 413);
        assert_eq!(body(&resp)["code"], "payload_too_large");
    }

    #[test]
    fn test_parse_id_accepts_numbers_and_strings() {
        assert_eq!(parse_id(Some(&json!(7))), Some(7));
        assert_eq!(parse_id(Some(&json!(" 12 "))), Some(12));
        assert_eq!(parse_id(Some(&json!(-1))), None);
        assert_eq!(parse_id(Some(&json!("abc"))), None);
        assert_eq!(parse_id(Some(&json!(null))), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let resp = ApiResponse::from_error(&ShopError::Overflow("coins"));
        assert_eq!(resp.status, 500);
        let json = body(&resp);
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "internal");
    }
}
