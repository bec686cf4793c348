use raobkit::RaobErr;
use rusqlite::{Connection, OpenFlags, NO_PARAMS};
use std::path::Path;

/// URLs the archive had no sounding for, so they are not requested again.
pub struct MissingUrlDb {
    db_conn: Connection,
}

impl MissingUrlDb {
    pub fn open_or_create(root: &Path) -> Result<Self, RaobErr> {
        let db_file = &root.join("missing.db");

        let db_conn = Connection::open_with_flags(
            db_file,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        db_conn.execute(
            "CREATE TABLE IF NOT EXISTS missing (
                url TEXT PRIMARY KEY,
                added TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            NO_PARAMS,
        )?;

        Ok(MissingUrlDb { db_conn })
    }

    pub fn is_missing(&self, url: &str) -> Result<bool, RaobErr> {
        let num_missing: i32 = self.db_conn.query_row(
            "SELECT COUNT(*) FROM missing WHERE url = ?1",
            &[url],
            |row| row.get(0),
        )?;

        Ok(num_missing > 0)
    }

    /// Like `is_missing`, but a database error is logged and treated as not missing.
    pub fn known_missing(&self, url: &str) -> bool {
        match self.is_missing(url) {
            Ok(missing) => missing,
            Err(err) => {
                tracing::warn!(%url, %err, "unable to check the missing url database");
                false
            }
        }
    }

    pub fn add_url(&self, url: &str) -> Result<(), RaobErr> {
        self.db_conn
            .execute("INSERT OR IGNORE INTO missing (url) VALUES (?1)", &[url])?;

        Ok(())
    }
}
