//! A small application: token-checking middleware, a status route and an `/auth` group.
//!
//! Run with `RUST_LOG=info cargo run --example app`, then try:
//!
//! ```text
//! curl -i http://127.0.0.1:5000/status
//! curl -i -X POST http://127.0.0.1:5000/auth/login
//! curl -i http://127.0.0.1:5000/users/42 -H 'Authorization: Bearer demo'
//! ```

use serde::Serialize;
use serde_json::json;
use yinzer_http::{
    error_handler, stage, HttpServer, MiddlewareScope, Route, Router, ServerConfig, Stage, StatusCode,
};

#[derive(Serialize)]
struct User {
    id: String,
    name: String,
}

fn authentication() -> Stage {
    stage(|ctx| {
        Box::pin(async move {
            if ctx.request.get_header("Authorization").map(String::as_str) == Some("Bearer demo") {
                return Ok(None);
            }
            ctx.response.set_status(401)?;
            Ok(Some(json!({ "success": false, "message": "Unauthorized" })))
        })
    })
}

fn auth_routes() -> Vec<Route> {
    vec![
        Route::post(
            "/register",
            stage(|ctx| {
                Box::pin(async move {
                    ctx.response.set_status(201)?;
                    Ok(Some(json!({ "success": true, "message": "User registered" })))
                })
            }),
        )
        .with_before_handler(stage(|ctx| {
            Box::pin(async move {
                if ctx.request.body.get("username").is_some() {
                    return Ok(None);
                }
                ctx.response.set_status(400)?;
                Ok(Some(json!({ "success": false, "message": "Invalid request" })))
            })
        })),
        Route::post(
            "/login",
            stage(|_ctx| Box::pin(async { Ok(Some(json!({ "success": true, "message": "Login successful" }))) })),
        ),
        Route::post(
            "/logout",
            stage(|_ctx| Box::pin(async { Ok(Some(json!({ "success": true, "message": "Logout successful" }))) })),
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut router = Router::new();

    router.before_all(
        authentication(),
        MiddlewareScope::all_except(["/auth/login", "/auth/register", "/auth/logout", "/status"]),
    );

    router.get(
        "/status",
        stage(|_ctx| Box::pin(async { Ok(Some(json!({ "success": true, "body": "Server is running" }))) })),
    );

    router
        .get(
            "/users/:id",
            stage(|ctx| {
                Box::pin(async move {
                    let user = User {
                        id: ctx.request.param("id").cloned().unwrap_or_default(),
                        name: ctx.request.get_query_param("name").cloned().unwrap_or_else(|| "anonymous".to_string()),
                    };
                    Ok(Some(serde_json::to_value(user)?))
                })
            }),
        )
        .after_handler = Some(stage(|ctx| {
        Box::pin(async move {
            ctx.response.add_headers([[("Cache-Control", "no-store")]]);
            Ok(None)
        })
    }));

    router.group(
        "/auth",
        auth_routes(),
        Some(stage(|ctx| {
            Box::pin(async move {
                // Throttle anything that is not a login attempt.
                if ctx.request.route_path() == "/auth/login" {
                    return Ok(None);
                }
                ctx.response.set_status(429)?;
                Ok(Some(json!({ "success": false, "message": "Too many requests" })))
            })
        })),
    );

    let server = HttpServer::new(ServerConfig::default(), router).with_error_handler(error_handler(
        |ctx, err| {
            Box::pin(async move {
                log::error!("Server error: {err}");
                ctx.response.set_status_code(StatusCode::InternalServerError);
                json!({ "success": false, "message": "Internal server error" })
            })
        },
    ));

    server.start().await?;

    Ok(())
}
