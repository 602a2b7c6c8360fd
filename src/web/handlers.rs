use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures_util::{StreamExt, TryStreamExt};
use log::{error, info};
use serde_json::json;
use tera::Context;

use crate::backend::BackendError;
use crate::web::models::{ChatRequest, ChatResponse, HistoryResponse, UploadResponse};
use crate::web::state::{View, FALLBACK_CHATBOT_NAME};
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let (view, chatbot_name, messages) = {
        let ui = match data.ui.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock page state mutex: {}", e);
                return HttpResponse::InternalServerError().body("Internal server error");
            }
        };
        (ui.view(), ui.chatbot_name().to_string(), ui.messages())
    };

    let mut context = Context::new();
    context.insert("view", &view);
    context.insert("chatbot_name", &chatbot_name);
    context.insert("messages", &messages);

    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// PDF upload endpoint: forwards the picked file to the backend and switches
// to the chat view when the backend issues a session for it.
pub async fn upload(data: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    // The chat owns the page once entered; further uploads are refused.
    {
        let ui = match data.ui.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock page state mutex: {}", e);
                return HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }));
            }
        };
        if ui.view() == View::Chat {
            return HttpResponse::Conflict().json(json!({ "error": "Chat already started" }));
        }
    }

    // Pull the `file` field out of the multipart form.
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        if field.name() != "file" {
            continue;
        }
        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(data) => bytes.extend_from_slice(&data),
                Err(e) => {
                    error!("Failed to read uploaded file: {}", e);
                    return HttpResponse::BadRequest().json(json!({
                        "error": "Failed to read uploaded file"
                    }));
                }
            }
        }
        file = Some((filename, bytes));
    }

    let (filename, bytes) = match file {
        Some(file) => file,
        None => return HttpResponse::BadRequest().json(json!({ "error": "No file part" })),
    };
    if filename.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "No selected file" }));
    }

    info!("Forwarding {} to the backend for ingestion", filename);

    match data.backend.upload_pdf(&filename, bytes).await {
        Ok(session) => {
            let chatbot_name = session
                .suggested_name
                .unwrap_or_else(|| FALLBACK_CHATBOT_NAME.to_string());

            let mut ui = match data.ui.lock() {
                Ok(guard) => guard,
                Err(e) => {
                    error!("Failed to lock page state mutex: {}", e);
                    return HttpResponse::InternalServerError().json(json!({
                        "error": "Internal server error"
                    }));
                }
            };
            if !ui.attach_session(session.session_id, chatbot_name.clone()) {
                // A concurrent request entered the chat first.
                return HttpResponse::Conflict().json(json!({ "error": "Chat already started" }));
            }

            info!("Chat session started as {}", chatbot_name);
            HttpResponse::Ok().json(UploadResponse { chatbot_name })
        }
        Err(e) => {
            error!("Error uploading PDF: {}", e);
            backend_error_response(&e)
        }
    }
}

// Continue-with-default endpoint: enters the chat view without contacting
// the backend, keeping the default session and name.
pub async fn continue_with_default(data: web::Data<AppState>) -> impl Responder {
    let mut ui = match data.ui.lock() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to lock page state mutex: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }
    };
    if ui.enter_chat() {
        info!("Continuing with the default document set");
    }
    HttpResponse::Ok().json(json!({ "chatbot_name": ui.chatbot_name() }))
}

// Chat API endpoint
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let text = req.message.trim();

    // An empty submit is a no-op: no backend call, no state change.
    if text.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "Message must not be empty" }));
    }

    // Record the user's turn, then release the lock before the round-trip.
    let (session_id, pending) = {
        let mut ui = match data.ui.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock page state mutex: {}", e);
                return HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }));
            }
        };
        if ui.view() != View::Chat {
            return HttpResponse::Conflict().json(json!({ "error": "Chat has not started" }));
        }
        (ui.session_id().to_string(), ui.begin_turn(text))
    };

    info!("Chat request for session {}: {}", session_id, text);

    match data.backend.chat(text, &session_id).await {
        Ok(reply) => {
            if let Ok(mut ui) = data.ui.lock() {
                ui.complete_turn(reply.clone());
            } else {
                // Not critical for the response, just log it.
                error!("Failed to record assistant reply");
            }
            HttpResponse::Ok().json(ChatResponse { reply })
        }
        Err(e) => {
            error!("Error from chat backend: {}", e);
            // Take the unanswered question back out of the conversation.
            if let Ok(mut ui) = data.ui.lock() {
                ui.rollback_turn(pending);
            }
            backend_error_response(&e)
        }
    }
}

// Page state snapshot for the front-end script.
pub async fn history(data: web::Data<AppState>) -> impl Responder {
    let ui = match data.ui.lock() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to lock page state mutex: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }
    };
    HttpResponse::Ok().json(HistoryResponse {
        view: ui.view(),
        chatbot_name: ui.chatbot_name().to_string(),
        messages: ui.messages(),
    })
}

fn backend_error_response(e: &BackendError) -> HttpResponse {
    HttpResponse::BadGateway().json(json!({ "error": e.to_string() }))
}
