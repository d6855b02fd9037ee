//! SQL schema for the deptboard SQLite store.
//!
//! Executed once at startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL UNIQUE CHECK (upper(name) != 'GLOBAL'),
    hod_user_id      INTEGER,
    hod_name         TEXT,
    description_en   TEXT    NOT NULL DEFAULT '',
    description_cn   TEXT,
    color_theme      TEXT    NOT NULL DEFAULT '#00F2FF',
    status_update    TEXT    NOT NULL DEFAULT 'v1.0.0',
    percent_complete INTEGER NOT NULL DEFAULT 0,  -- 0..=100 expected, unenforced
    is_visible       INTEGER NOT NULL DEFAULT 1,
    last_updated     TEXT    NOT NULL             -- RFC 3339 UTC, microseconds
);

-- No delete path exists for feed entries or departments.
CREATE TABLE IF NOT EXISTS activity_feed (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    dept_metadata_id INTEGER NOT NULL REFERENCES departments(id),
    author_id        INTEGER,
    author_name      TEXT,
    content_en       TEXT    NOT NULL,
    content_cn       TEXT,
    is_pinned        INTEGER NOT NULL DEFAULT 0,
    kind             TEXT    NOT NULL DEFAULT 'REQUEST',
    created_at       TEXT    NOT NULL
);

-- department_id NULL is the global node.
CREATE TABLE IF NOT EXISTS forum_topics (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    department_id INTEGER REFERENCES departments(id) ON DELETE CASCADE,
    author_name   TEXT    NOT NULL,
    title         TEXT    NOT NULL,
    content       TEXT    NOT NULL,
    created_at    TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS forum_replies (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id    INTEGER NOT NULL REFERENCES forum_topics(id) ON DELETE CASCADE,
    author_name TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS activity_dept_idx    ON activity_feed(dept_metadata_id, created_at);
CREATE INDEX IF NOT EXISTS topics_department_idx ON forum_topics(department_id, created_at);
CREATE INDEX IF NOT EXISTS replies_topic_idx     ON forum_replies(topic_id, created_at);

PRAGMA user_version = 1;
";

/// Column list shared by every department read.
pub const DEPARTMENT_COLUMNS: &str = "id, name, hod_user_id, hod_name, description_en, \
   description_cn, color_theme, status_update, percent_complete, is_visible, last_updated";

/// Column list shared by every activity-feed read.
pub const ACTIVITY_COLUMNS: &str = "id, dept_metadata_id, author_id, author_name, \
   content_en, content_cn, is_pinned, kind, created_at";

/// Topic columns, joined with `departments d` to recover the node key.
pub const TOPIC_SELECT: &str = "SELECT t.id, t.department_id, COALESCE(d.name, 'GLOBAL'), \
   t.author_name, t.title, t.content, t.created_at
   FROM forum_topics t
   LEFT JOIN departments d ON d.id = t.department_id";

/// Column list shared by every reply read.
pub const REPLY_COLUMNS: &str = "id, topic_id, author_name, content, created_at";
