//! OAuth discovery documents. Unauthenticated; clients read these after a
//! 401 from `/mcp` to find out where to get a token.

use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::models::{AuthorizationServerMetadata, ProtectedResourceMetadata};
use crate::AppState;

pub const PROTECTED_RESOURCE_PATH: &str = "/.well-known/oauth-protected-resource";
pub const AUTHORIZATION_SERVER_PATH: &str = "/.well-known/oauth-authorization-server";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(PROTECTED_RESOURCE_PATH)
            .route(web::get().to(protected_resource))
            .route(web::method(Method::OPTIONS).to(protected_resource)),
    );
    cfg.service(
        web::resource(vec![
            AUTHORIZATION_SERVER_PATH.to_string(),
            format!("{}/{{path:.*}}", AUTHORIZATION_SERVER_PATH),
        ])
        .route(web::get().to(authorization_server))
        .route(web::method(Method::OPTIONS).to(authorization_server)),
    );
}

/// `scheme://host` the client used to reach us
pub fn request_base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

async fn protected_resource(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let metadata =
        ProtectedResourceMetadata::new(&request_base_url(&req), &state.config.auth);
    HttpResponse::Ok().json(metadata)
}

async fn authorization_server(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(AuthorizationServerMetadata::new(&state.config.auth))
}
