pub mod assist;
pub mod attachment;
pub mod comment;
pub mod enums;
pub mod ids;
pub mod io;
pub mod request;

pub use assist::AssistTicket;
pub use attachment::Attachment;
pub use comment::Comment;
pub use enums::{AssistKind, AssistStatus, CommentKind, RequestStatus, Role};
pub use ids::{AssistId, AttachmentId, CategoryId, CommentId, RequestId, UserId};
pub use request::Request;
