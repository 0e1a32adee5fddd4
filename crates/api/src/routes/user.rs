use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use dwellhub_db::models::{Role, User};
use dwellhub_services::{
    auth::{Entity, Operation},
    dao::user::UserPatch,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{hex, hex_ids, parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, query::ApiQuery},
    state::AppState,
};

/// Largest avatar file accepted.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub has_google: bool,
    pub property_ids: Vec<String>,
    pub booking_ids: Vec<String>,
    pub lease_ids: Vec<String>,
    pub maintenance_request_ids: Vec<String>,
    pub notification_ids: Vec<String>,
    pub transaction_ids_as_payer: Vec<String>,
    pub transaction_ids_as_receiver: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: hex(u.id),
            email: u.email,
            full_name: u.full_name,
            avatar: u.avatar,
            phone_number: u.phone_number,
            role: u.role,
            is_verified: u.is_verified,
            has_google: u.google_id.is_some(),
            property_ids: hex_ids(&u.property_ids),
            booking_ids: hex_ids(&u.booking_ids),
            lease_ids: hex_ids(&u.lease_ids),
            maintenance_request_ids: hex_ids(&u.maintenance_request_ids),
            notification_ids: hex_ids(&u.notification_ids),
            transaction_ids_as_payer: hex_ids(&u.transaction_ids_as_payer),
            transaction_ids_as_receiver: hex_ids(&u.transaction_ids_as_receiver),
            created_at: rfc3339(u.created_at),
            updated_at: rfc3339(u.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.find_all(query.role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&user_id, "user")?;
    let user = state.users.base.find_by_id(id).await?;
    Ok(Json(user.into()))
}

/// Text and file parts of the profile form.
#[derive(Debug, Default)]
struct ProfileForm {
    full_name: Option<String>,
    phone_number: Option<String>,
    current_password: Option<String>,
    new_password: Option<String>,
    role: Option<String>,
    is_verified: Option<String>,
    remove_avatar: bool,
    avatar: Option<AvatarUpload>,
}

#[derive(Debug)]
struct AvatarUpload {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "avatar" {
            let filename = field.file_name().unwrap_or("avatar").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
            if !bytes.is_empty() {
                form.avatar = Some(AvatarUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
        let text = text.trim().to_string();

        match name.as_str() {
            "full_name" => form.full_name = Some(text),
            "phone_number" => form.phone_number = Some(text),
            "current_password" => form.current_password = Some(text),
            "new_password" => form.new_password = Some(text),
            "role" => form.role = Some(text),
            "is_verified" => form.is_verified = Some(text),
            "remove_avatar" => form.remove_avatar = matches!(text.as_str(), "true" | "1"),
            _ => {}
        }
    }

    Ok(form)
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    match raw {
        "client" => Ok(Role::Client),
        "owner" => Ok(Role::Owner),
        "admin" => Ok(Role::Admin),
        other => Err(ApiError::Validation(format!("Unknown role '{other}'"))),
    }
}

fn image_kind(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        _ => None,
    }
}

fn mime_kind(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Extension the upload is stored under. Only jpeg, png and gif pass, and the
/// file name and declared content type must agree.
fn avatar_extension(upload: &AvatarUpload) -> Result<&'static str, ApiError> {
    if upload.bytes.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::Validation(
            "Avatar must be at most 5 MB".to_string(),
        ));
    }

    let by_name = FsPath::new(&upload.filename)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(image_kind);
    let by_type = upload.content_type.as_deref().and_then(mime_kind);

    match (by_name, by_type) {
        (Some(name), Some(declared)) if name == declared => Ok(name),
        _ => Err(ApiError::Validation(
            "Avatar must be a jpeg, png or gif image".to_string(),
        )),
    }
}

/// Writes the avatar under the upload dir and returns its public path.
async fn store_avatar(
    upload_dir: &str,
    user_id: &str,
    upload: &AvatarUpload,
) -> Result<String, ApiError> {
    let ext = avatar_extension(upload)?;
    let stored = format!("{}.{}", uuid::Uuid::new_v4(), ext);

    let dir = FsPath::new(upload_dir).join("avatars").join(user_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create upload dir: {e}")))?;
    tokio::fs::write(dir.join(&stored), &upload.bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write file: {e}")))?;

    Ok(format!("/uploads/avatars/{user_id}/{stored}"))
}

/// Removes a previously stored avatar. Missing files are only logged.
async fn discard_avatar(upload_dir: &str, public_path: &str) {
    let Some(relative) = public_path.strip_prefix("/uploads/") else {
        return;
    };
    if relative.split('/').any(|part| part == "..") {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(FsPath::new(upload_dir).join(relative)).await {
        warn!(path = public_path, error = %e, "Failed to remove old avatar");
    }
}

/// Multipart profile update. Fields: `full_name`, `phone_number`,
/// `current_password` + `new_password`, `role`, `is_verified`, `avatar`
/// (file), `remove_avatar`.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let principal = auth.authorize(Entity::User, Operation::Update)?;
    let id = parse_id(&user_id, "user")?;
    if principal.id != id && !principal.is_admin() {
        return Err(ApiError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }

    let user = state.users.base.find_by_id(id).await?;
    let form = read_form(multipart?).await?;
    let mut patch = UserPatch {
        full_name: form.full_name.filter(|n| !n.is_empty()),
        phone_number: form.phone_number,
        ..Default::default()
    };

    if let Some(new_password) = form.new_password.filter(|p| !p.is_empty()) {
        if new_password.len() < 6 {
            return Err(ApiError::Validation(
                "new_password must be at least 6 characters".to_string(),
            ));
        }
        // Admins resetting someone else's password skip the check.
        if principal.id == id {
            let current = form.current_password.ok_or_else(|| {
                ApiError::Validation("current_password is required".to_string())
            })?;
            state
                .auth
                .check_credentials(&user, &current)
                .map_err(|_| ApiError::Unauthorized("Current password is incorrect".to_string()))?;
        }
        patch.password_hash = Some(state.auth.hash_password(&new_password)?);
    }

    if let Some(raw) = form.role.filter(|r| !r.is_empty()) {
        let role = parse_role(&raw)?;
        if role == Role::Admin && !principal.is_admin() {
            return Err(ApiError::Forbidden("Only an admin can grant admin".to_string()));
        }
        patch.role = Some(role);
    }

    if let Some(raw) = form.is_verified {
        if !principal.is_admin() {
            return Err(ApiError::Forbidden(
                "Only an admin can change verification".to_string(),
            ));
        }
        patch.is_verified = Some(matches!(raw.as_str(), "true" | "1"));
    }

    let upload_dir = &state.settings.app.upload_dir;
    if let Some(upload) = form.avatar {
        let path = store_avatar(upload_dir, &id.to_hex(), &upload).await?;
        patch.avatar = Some(Some(path));
    } else if form.remove_avatar {
        patch.avatar = Some(None);
    }

    let replaces_avatar = patch.avatar.is_some();
    let updated = state.users.update(id, patch).await?;
    if replaces_avatar {
        if let Some(old) = user.avatar.as_deref() {
            discard_avatar(upload_dir, old).await;
        }
    }

    info!(user_id = %id, by = %principal.id, "User updated");
    Ok(Json(updated.into()))
}
