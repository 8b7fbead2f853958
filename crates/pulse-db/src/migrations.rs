use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS reports (
            id          TEXT PRIMARY KEY,
            author_id   TEXT NOT NULL REFERENCES users(id),
            report_type TEXT NOT NULL,
            description TEXT NOT NULL,
            latitude    REAL NOT NULL,
            longitude   REAL NOT NULL,
            urgency     TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'pending',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reports_author
            ON reports(author_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_reports_status
            ON reports(status);
        CREATE INDEX IF NOT EXISTS idx_reports_location
            ON reports(latitude, longitude);

        CREATE TABLE IF NOT EXISTS contacts (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL,
            subject     TEXT NOT NULL,
            message     TEXT NOT NULL,
            attachment  TEXT,
            status      TEXT NOT NULL DEFAULT 'new',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_contacts_status
            ON contacts(status);

        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            category    TEXT NOT NULL DEFAULT '',
            archived    INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notes_owner
            ON notes(owner_id, created_at);

        CREATE TABLE IF NOT EXISTS consultations (
            id           TEXT PRIMARY KEY,
            patient_id   TEXT NOT NULL REFERENCES users(id),
            question     TEXT NOT NULL,
            category     TEXT NOT NULL DEFAULT '',
            status       TEXT NOT NULL DEFAULT 'pending',
            response     TEXT,
            responder_id TEXT REFERENCES users(id),
            responded_at TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_consultations_patient
            ON consultations(patient_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_consultations_status
            ON consultations(status);

        CREATE TABLE IF NOT EXISTS doctor_requests (
            id             TEXT PRIMARY KEY,
            applicant_id   TEXT NOT NULL REFERENCES users(id),
            specialty      TEXT NOT NULL,
            license_number TEXT NOT NULL,
            credentials    TEXT NOT NULL DEFAULT '',
            status         TEXT NOT NULL DEFAULT 'pending',
            reviewer_id    TEXT REFERENCES users(id),
            reason         TEXT,
            created_at     TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_doctor_requests_applicant
            ON doctor_requests(applicant_id);
        CREATE INDEX IF NOT EXISTS idx_doctor_requests_status
            ON doctor_requests(status);

        CREATE TABLE IF NOT EXISTS first_aid (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            category    TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS hospitals (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            address     TEXT NOT NULL,
            phone       TEXT NOT NULL DEFAULT '',
            latitude    REAL NOT NULL,
            longitude   REAL NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_hospitals_location
            ON hospitals(latitude, longitude);

        CREATE TABLE IF NOT EXISTS notifications (
            id           TEXT PRIMARY KEY,
            recipient_id TEXT NOT NULL REFERENCES users(id),
            kind         TEXT NOT NULL,
            title        TEXT NOT NULL,
            message      TEXT NOT NULL,
            read         INTEGER NOT NULL DEFAULT 0,
            entity_id    TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_recipient
            ON notifications(recipient_id, read, created_at);

        CREATE TABLE IF NOT EXISTS admin_messages (
            id           TEXT PRIMARY KEY,
            sender_id    TEXT NOT NULL REFERENCES users(id),
            recipient_id TEXT NOT NULL REFERENCES users(id),
            subject      TEXT NOT NULL,
            body         TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'new',
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_admin_messages_recipient
            ON admin_messages(recipient_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
