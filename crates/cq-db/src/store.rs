use cq_core::error::CiviqError;
use cq_core::store::Store;
use rusqlite::Connection;

use crate::assist_repo::AssistRepo;
use crate::attachment_repo::AttachmentRepo;
use crate::comment_repo::CommentRepo;
use crate::request_repo::RequestRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn tx_failed(err: rusqlite::Error) -> CiviqError {
    CiviqError::Internal {
        message: err.to_string(),
    }
}

impl Store for DbStore {
    type Requests<'a>
        = RequestRepo<'a>
    where
        Self: 'a;
    type Comments<'a>
        = CommentRepo<'a>
    where
        Self: 'a;
    type Attachments<'a>
        = AttachmentRepo<'a>
    where
        Self: 'a;
    type Assists<'a>
        = AssistRepo<'a>
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_> {
        RequestRepo::new(&self.conn)
    }

    fn comments(&self) -> Self::Comments<'_> {
        CommentRepo::new(&self.conn)
    }

    fn attachments(&self) -> Self::Attachments<'_> {
        AttachmentRepo::new(&self.conn)
    }

    fn assists(&self) -> Self::Assists<'_> {
        AssistRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, CiviqError>
    where
        F: FnOnce(&Self) -> Result<T, CiviqError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(tx_failed)?;
        let result = f(self);
        match result {
            Ok(value) => {
                self.conn.execute_batch("COMMIT").map_err(tx_failed)?;
                Ok(value)
            }
            Err(err) => {
                self.conn.execute_batch("ROLLBACK").map_err(tx_failed)?;
                Err(err)
            }
        }
    }
}
