//! `POST /mcp` handler: authenticate, parse, dispatch

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::protocol::{
    RpcError, RpcRequest, RpcResponse, DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION,
};
use crate::auth::{AuthContext, AuthError};
use crate::controllers::health::VERSION;
use crate::controllers::well_known::{request_base_url, PROTECTED_RESOURCE_PATH};
use crate::tools::ToolContext;
use crate::AppState;

pub const SERVER_NAME: &str = "Kino MCP Server";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/mcp").route(web::post().to(handle_rpc)));
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn handle_rpc(state: web::Data<AppState>, req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let auth = match authenticate_request(&state, &req).await {
        Ok(auth) => auth,
        Err(resp) => return resp,
    };

    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("[MCP] Unparseable request body: {}", e);
            return HttpResponse::Ok().json(RpcResponse::error(Value::Null, RpcError::parse_error()));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        let id = request.id.unwrap_or(Value::Null);
        return HttpResponse::Ok().json(RpcResponse::error(
            id,
            RpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }

    if request.is_notification() {
        log::debug!("[MCP] Notification {}", request.method);
        return HttpResponse::Accepted().finish();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let context = ToolContext {
        auth: Some(auth),
        db: Arc::clone(&state.db),
    };

    let response = match dispatch_method(&request, &state, &context).await {
        Ok(value) => RpcResponse::success(id, value),
        Err(error) => RpcResponse::error(id, error),
    };

    HttpResponse::Ok().json(response)
}

/// Verify the bearer token, or build the 401 the client should see
async fn authenticate_request(
    state: &AppState,
    req: &HttpRequest,
) -> Result<AuthContext, HttpResponse> {
    let result = match bearer_token(req) {
        Some(token) => state.verifier.verify(token).await,
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(verified) => Ok(AuthContext::from_verified(verified)),
        Err(e) => {
            log::warn!("[MCP] Rejected request from {:?}: {}", req.peer_addr(), e);
            Err(unauthorized_response(req, &e))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized_response(req: &HttpRequest, err: &AuthError) -> HttpResponse {
    let metadata_url = format!("{}{}", request_base_url(req), PROTECTED_RESOURCE_PATH);

    HttpResponse::build(err.status_code())
        .insert_header((header::WWW_AUTHENTICATE, err.www_authenticate(&metadata_url)))
        .json(RpcResponse::error(Value::Null, RpcError::unauthorized(err.to_string())))
}

async fn dispatch_method(
    request: &RpcRequest,
    state: &AppState,
    context: &ToolContext,
) -> Result<Value, RpcError> {
    match request.method.as_str() {
        "initialize" => {
            let protocol_version = request
                .params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);

            Ok(json!({
                "protocolVersion": protocol_version,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": VERSION }
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => {
            let tools = serde_json::to_value(state.tool_registry.list_definitions())
                .map_err(|e| RpcError::internal_error(e.to_string()))?;
            Ok(json!({ "tools": tools }))
        }
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(request.params.clone())
                .map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))?;

            let subject = context
                .auth
                .as_ref()
                .and_then(|auth| auth.subject())
                .unwrap_or("-");
            log::info!("[MCP] tools/call {} for {}", params.name, subject);

            let result = state
                .tool_registry
                .execute(&params.name, params.arguments, context)
                .await
                .ok_or_else(|| RpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

            if !result.success {
                log::warn!("[MCP] {} for {}: {}", params.name, subject, result.content);
            }

            Ok(json!({
                "content": [{ "type": "text", "text": result.content }],
                "isError": false
            }))
        }
        _ => Err(RpcError::method_not_found()),
    }
}
