use crate::CiviqError;
use crate::assists::AssistRepository;
use crate::attachments::AttachmentRepository;
use crate::comments::CommentRepository;
use crate::requests::RequestRepository;

pub trait Store {
    type Requests<'a>: RequestRepository
    where
        Self: 'a;
    type Comments<'a>: CommentRepository
    where
        Self: 'a;
    type Attachments<'a>: AttachmentRepository
    where
        Self: 'a;
    type Assists<'a>: AssistRepository
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_>;
    fn comments(&self) -> Self::Comments<'_>;
    fn attachments(&self) -> Self::Attachments<'_>;
    fn assists(&self) -> Self::Assists<'_>;

    /// Runs `f` as one unit of work: committed when it returns `Ok`, rolled
    /// back otherwise.
    fn with_tx<F, T>(&self, f: F) -> Result<T, CiviqError>
    where
        F: FnOnce(&Self) -> Result<T, CiviqError>;
}
