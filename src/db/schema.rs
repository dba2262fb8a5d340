//! Database schema and migrations for classhub.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name       TEXT NOT NULL,
    email           TEXT NOT NULL,
    password        TEXT NOT NULL,           -- Argon2 hash
    refresh_token   TEXT,                    -- current refresh token, NULL when logged out
    otp             TEXT,
    otp_expiry      TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_email_nocase ON users(email COLLATE NOCASE);
"#,
    // v2: classrooms
    r#"
CREATE TABLE classrooms (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    university  TEXT NOT NULL,
    faculty     TEXT NOT NULL,
    description TEXT,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_classrooms_university_faculty
    ON classrooms(university COLLATE NOCASE, faculty COLLATE NOCASE);
CREATE INDEX idx_classrooms_owner_id ON classrooms(owner_id);
"#,
    // v3: resources and their stored file URLs
    r#"
CREATE TABLE resources (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    classroom_id    INTEGER REFERENCES classrooms(id) ON DELETE SET NULL,
    title           TEXT NOT NULL,
    text            TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_resources_owner_id ON resources(owner_id);
CREATE INDEX idx_resources_classroom_id ON resources(classroom_id);

CREATE TABLE resource_files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    position    INTEGER NOT NULL,
    url         TEXT NOT NULL,
    UNIQUE(resource_id, position)
);
"#,
    // v4: full-text index over resource title/text
    r#"
CREATE VIRTUAL TABLE resources_fts USING fts5(
    title,
    text,
    content='resources',
    content_rowid='id'
);

CREATE TRIGGER resources_fts_insert AFTER INSERT ON resources BEGIN
    INSERT INTO resources_fts(rowid, title, text) VALUES (new.id, new.title, new.text);
END;

CREATE TRIGGER resources_fts_delete AFTER DELETE ON resources BEGIN
    INSERT INTO resources_fts(resources_fts, rowid, title, text)
        VALUES ('delete', old.id, old.title, old.text);
END;

CREATE TRIGGER resources_fts_update AFTER UPDATE ON resources BEGIN
    INSERT INTO resources_fts(resources_fts, rowid, title, text)
        VALUES ('delete', old.id, old.title, old.text);
    INSERT INTO resources_fts(rowid, title, text) VALUES (new.id, new.title, new.text);
END;
"#,
];
