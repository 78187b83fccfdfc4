use crate::error::{Error, Result};
use crate::services::workflow_service::ApplicationSubmission;
use crate::utils::validation::{is_valid_phone, sanitize_input, validate};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::path::Path as StdPath;
use tokio::fs;
use validator::Validate;

#[derive(Debug, Validate)]
struct SubmitApplicationRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(email)]
    email: String,
}

struct UploadedFile {
    filename: String,
    data: bytes::Bytes,
}

async fn save_resume_file(uploads_dir: &str, file: &UploadedFile) -> Result<String> {
    let ext = StdPath::new(&file.filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    let allowed_exts = ["pdf", "txt"];
    if !allowed_exts.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }

    if ext == "pdf" && !file.data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }

    fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

    let safe_filename = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    let file_path = format!("{}/{}", uploads_dir, safe_filename);

    fs::write(&file_path, &file.data).await.map_err(|e| {
        tracing::error!("Failed to write resume file: {}", e);
        Error::Internal(format!("Failed to save file: {}", e))
    })?;

    Ok(file_path)
}

async fn extract_text_from_file(file_path: &str) -> String {
    let ext = StdPath::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext.to_lowercase().as_str() {
        "pdf" => {
            let output = tokio::process::Command::new("pdftotext")
                .arg("-layout")
                .arg(file_path)
                .arg("-")
                .output()
                .await;

            match output {
                Ok(out) => String::from_utf8_lossy(&out.stdout).to_string(),
                Err(e) => {
                    tracing::error!("Failed to run pdftotext on {}: {}", file_path, e);
                    String::new()
                }
            }
        }
        "txt" => match fs::read_to_string(file_path).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to read txt file {}: {}", file_path, e);
                String::new()
            }
        },
        _ => String::new(),
    }
}

async fn extract_upload(uploads_dir: &str, file: &UploadedFile) -> Result<String> {
    let path = save_resume_file(uploads_dir, file).await?;
    let text = extract_text_from_file(&path).await;
    let _ = fs::remove_file(&path).await;
    Ok(text.trim().to_string())
}

/// Multipart ingestion: `name`, `email`, optional `phone` fields plus a
/// required `resume` file and optional `cover_letter`. Malformed input is
/// rejected here and never enters the workflow.
pub async fn submit_application(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    let mut name = String::new();
    let mut email = String::new();
    let mut phone: Option<String> = None;
    let mut resume: Option<UploadedFile> = None;
    let mut cover_letter: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = sanitize_input(&field.text().await?),
            "email" => email = field.text().await?.trim().to_lowercase(),
            "phone" => {
                let raw = field.text().await?.trim().to_string();
                if !raw.is_empty() {
                    phone = Some(raw);
                }
            }
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let data = field.bytes().await?;
                resume = Some(UploadedFile { filename, data });
            }
            "cover_letter" => {
                let filename = field.file_name().unwrap_or("cover_letter.bin").to_string();
                let data = field.bytes().await?;
                cover_letter = Some(UploadedFile { filename, data });
            }
            other => tracing::warn!("ignoring unknown multipart field '{}'", other),
        }
    }

    let request = SubmitApplicationRequest {
        name: name.clone(),
        email: email.clone(),
    };
    validate(&request)?;

    if let Some(ref p) = phone {
        if !is_valid_phone(p) {
            return Err(Error::BadRequest("Invalid phone number".into()));
        }
    }

    let resume = resume.ok_or_else(|| Error::BadRequest("Resume file is required".into()))?;

    let uploads_dir = state.config.uploads_dir.clone();
    let resume_text = extract_upload(&uploads_dir, &resume).await?;
    if resume_text.is_empty() {
        return Err(Error::BadRequest(
            "Could not extract any text from the resume".into(),
        ));
    }

    let cover_letter_text = match cover_letter {
        Some(file) => {
            let text = extract_upload(&uploads_dir, &file).await?;
            (!text.is_empty()).then_some(text)
        }
        None => None,
    };

    let submission = ApplicationSubmission {
        candidate_name: name,
        candidate_email: email,
        phone,
        resume_text,
        cover_letter_text,
    };

    let outcome = state
        .workflow
        .process_application(submission, crate::utils::time::now())
        .await?;

    Ok(Json(outcome))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let record = state
        .applications
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
    Ok(Json(record))
}
