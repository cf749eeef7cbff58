use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request not found")]
    NotFound,
    #[error("not allowed to modify this request")]
    Forbidden,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("request not found")]
    RequestNotFound,
    #[error("comment not found")]
    NotFound,
    #[error("comment already deleted")]
    AlreadyDeleted,
    #[error("not allowed to delete this comment")]
    Forbidden,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("request not found")]
    RequestNotFound,
    #[error("attachment not found")]
    NotFound,
    #[error("not allowed to delete this attachment")]
    Forbidden,
    #[error("unsupported file type: {extension}")]
    UnsupportedType { extension: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("file storage failed: {message}")]
    File { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("assist ticket not found")]
    NotFound,
    #[error("not allowed to modify this ticket")]
    Forbidden,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum CiviqError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Assist(#[from] AssistError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
