/// Post handlers - composer uploads and engagement actions
use crate::domain::models::EngagementAction;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::notify::WithNotice;
use crate::services::{ComposeDraft, MediaFile};
use crate::state::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use uuid::Uuid;

/// Largest accepted media file
const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;
/// Largest accepted text part
const MAX_TEXT_BYTES: usize = 64 * 1024;

async fn read_field(field: &mut Field, limit: usize) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Err(AppError::Validation(format!(
                "Upload exceeds the {} MB limit",
                limit / (1024 * 1024)
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

async fn read_text(field: &mut Field) -> Result<String> {
    let bytes = read_field(field, MAX_TEXT_BYTES).await?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AppError::Validation("Text must be valid UTF-8".into()))
}

/// Build a compose draft from `content`, `mention` and repeated `media` parts
async fn read_draft(mut payload: Multipart) -> Result<ComposeDraft> {
    let mut draft = ComposeDraft::new();
    draft.open();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => draft.set_content(read_text(&mut field).await?),
            "mention" => {
                let mention = read_text(&mut field).await?;
                draft.set_mention(mention.trim().trim_start_matches('@'));
            }
            "media" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = read_field(&mut field, MAX_MEDIA_BYTES).await?;
                draft.add_media([MediaFile::new(file_name, content_type, bytes)]);
            }
            _ => {
                read_field(&mut field, MAX_MEDIA_BYTES).await?;
            }
        }
    }

    draft.apply_mention();
    Ok(draft)
}

/// Create a post from a multipart compose form
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut draft = read_draft(payload).await?;
    let outcome = state.composer.submit(user.0.id, &mut draft).await?;
    let notice = outcome.notice();
    Ok(HttpResponse::Created().json(WithNotice::new(outcome, notice)))
}

/// Like, bookmark, repost or delete a post
pub async fn post_action(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (post_id, action) = path.into_inner();
    let action: EngagementAction = action.parse().map_err(AppError::Validation)?;

    let outcome = state.engagement.perform(user.0.id, post_id, action).await?;
    let notice = outcome.notice();
    Ok(HttpResponse::Ok().json(WithNotice::new(outcome, notice)))
}
