use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::goals;
use crate::locale::Locale;
use crate::models::{
    index_catalog, BodyWeightEntry, ExerciseCatalog, ExerciseCatalogEntry, FitnessGoal, Goal,
    GoalType, PersonalRecord, Profile, ProgramExercise, ProgramSession, SessionExercise,
    TrainingHistory, TrainingProgram, TrainingRecord, TrainingSession, TrainingSessionWithExercises,
};
use crate::requests::{
    BodyWeightRequest, ExerciseRequest, GoalProgressRequest, GoalRequest, PersonalRecordRequest,
    ProfileRequest, ProgramExerciseRequest, ProgramSessionRequest, SessionExerciseRequest,
    TrainingProgramRequest, TrainingRecordRequest, TrainingSessionRequest,
};
use crate::validation::{clamp_rating, Pagination, DEFAULT_RATING, DEFAULT_SORENESS};

type DbResult<T> = Result<T, DatabaseError>;

/// Built-in catalog: name, description, category, muscle group
const DEFAULT_EXERCISES: &[(&str, &str, &str, &str)] = &[
    ("Жим штанги лежа", "Классический жим на горизонтальной скамье.", "Базовое", "Грудь"),
    ("Жим гантелей лежа", "Жим гантелей с увеличенной амплитудой.", "Базовое", "Грудь"),
    ("Жим штанги на наклонной скамье", "Жим под углом 30-45° на верх груди.", "Базовое", "Грудь"),
    ("Разводка гантелей лежа", "Разведение гантелей со слегка согнутыми локтями.", "Изолирующее", "Грудь"),
    ("Отжимания на брусьях", "Отжимания с наклоном корпуса вперед.", "Базовое", "Грудь"),
    ("Сведения в кроссовере", "Сведение рукоятей кроссовера перед собой.", "Изолирующее", "Грудь"),
    ("Становая тяга", "Подъем штанги с пола с прямой спиной.", "Базовое", "Спина"),
    ("Румынская тяга", "Тяга на прямых ногах для низа спины и бицепса бедра.", "Базовое", "Спина"),
    ("Подтягивания широким хватом", "Подтягивания с акцентом на широчайшие.", "Базовое", "Спина"),
    ("Тяга штанги в наклоне", "Тяга штанги к поясу в наклоне.", "Базовое", "Спина"),
    ("Тяга верхнего блока к груди", "Тяга рукояти к верху груди.", "Базовое", "Спина"),
    ("Тяга нижнего блока к поясу", "Тяга рукояти к поясу сидя.", "Базовое", "Спина"),
    ("Гиперэкстензия", "Разгибания спины для поясницы.", "Изолирующее", "Спина"),
    ("Приседания со штангой", "Присед со штангой на плечах.", "Базовое", "Ноги"),
    ("Фронтальные приседания", "Присед со штангой на груди.", "Базовое", "Ноги"),
    ("Жим ногами", "Жим платформы в тренажере.", "Базовое", "Ноги"),
    ("Выпады с гантелями", "Выпады с гантелями в руках.", "Базовое", "Ноги"),
    ("Разгибания ног в тренажере", "Разгибание ног с валиком.", "Изолирующее", "Ноги"),
    ("Сгибания ног лежа", "Сгибание ног в тренажере лежа.", "Изолирующее", "Ноги"),
    ("Подъемы на носки стоя", "Подъемы на носки для икр.", "Изолирующее", "Ноги"),
    ("Жим штанги стоя (армейский жим)", "Жим штанги над головой стоя.", "Базовое", "Плечи"),
    ("Жим гантелей сидя", "Жим гантелей над головой сидя.", "Базовое", "Плечи"),
    ("Тяга штанги к подбородку", "Тяга штанги вдоль тела широким хватом.", "Базовое", "Плечи"),
    ("Разводка гантелей в стороны стоя", "Подъем гантелей в стороны на средние дельты.", "Изолирующее", "Плечи"),
    ("Разводка в наклоне", "Разведение гантелей в наклоне на задние дельты.", "Изолирующее", "Плечи"),
    ("Подъем штанги на бицепс стоя", "Сгибание рук со штангой.", "Изолирующее", "Руки"),
    ("Молотковые сгибания", "Сгибания с гантелями параллельным хватом.", "Изолирующее", "Руки"),
    ("Французский жим лежа", "Разгибание рук со штангой из-за головы.", "Изолирующее", "Руки"),
    ("Разгибания на верхнем блоке", "Разгибание рук на блоке.", "Изолирующее", "Руки"),
    ("Жим лежа узким хватом", "Жим штанги узким хватом.", "Базовое", "Руки"),
    ("Планка классическая", "Упор на предплечьях с прямым корпусом.", "Изолирующее", "Пресс"),
    ("Скручивания", "Подъем корпуса к коленям.", "Изолирующее", "Пресс"),
    ("Подъем ног в висе", "Подъем прямых ног в висе на перекладине.", "Изолирующее", "Пресс"),
];

/// Training history query
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryQuery {
    pub pagination: Pagination,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    pub profile_count: u64,
    pub exercise_count: u64,
    pub training_record_count: u64,
    pub session_count: u64,
    pub program_count: u64,
}

/// SQLite-backed record store
pub struct Database {
    conn: Connection,
    locale: Locale,
}

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> DbResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory store
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        let mut db = Self {
            conn,
            locale: Locale::default(),
        };
        db.init_schema()?;
        db.seed_default_exercises()?;
        Ok(db)
    }

    /// Locale used for defaults such as goal units
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&mut self) -> DbResult<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER,
                gender TEXT,
                weight TEXT,
                height INTEGER,
                goal TEXT,
                experience TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                muscle_group TEXT NOT NULL DEFAULT '',
                is_custom BOOLEAN NOT NULL DEFAULT FALSE
            );

            -- Legacy 4x6 grid log, grid stored as JSON
            CREATE TABLE IF NOT EXISTS training_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                exercise TEXT NOT NULL,
                weeks INTEGER NOT NULL,
                grid TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS body_weights (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                weight TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS personal_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                exercise TEXT NOT NULL,
                weight TEXT NOT NULL,
                reps INTEGER NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                goal_type TEXT NOT NULL,
                exercise TEXT NOT NULL DEFAULT '',
                target_value TEXT NOT NULL,
                current_value TEXT NOT NULL,
                unit TEXT NOT NULL,
                target_date TEXT NOT NULL,
                achieved BOOLEAN NOT NULL DEFAULT FALSE,
                achieved_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS training_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                duration INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT '',
                energy INTEGER NOT NULL,
                mood INTEGER NOT NULL,
                soreness INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            -- Performed sets stored as JSON
            CREATE TABLE IF NOT EXISTS session_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                training_session_id INTEGER NOT NULL,
                exercise TEXT NOT NULL,
                sets TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (training_session_id) REFERENCES training_sessions (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS training_programs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (profile_id) REFERENCES profiles (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS program_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                program_id INTEGER NOT NULL,
                exercise TEXT NOT NULL,
                day_of_week INTEGER NOT NULL,
                position INTEGER NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (program_id) REFERENCES training_programs (id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS program_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                program_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (program_id) REFERENCES training_programs (id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_training_records_profile ON training_records (profile_id);
            CREATE INDEX IF NOT EXISTS idx_body_weights_profile_date ON body_weights (profile_id, date);
            CREATE INDEX IF NOT EXISTS idx_personal_records_profile_date ON personal_records (profile_id, date);
            CREATE INDEX IF NOT EXISTS idx_goals_profile ON goals (profile_id);
            CREATE INDEX IF NOT EXISTS idx_training_sessions_profile_date ON training_sessions (profile_id, date);
            CREATE INDEX IF NOT EXISTS idx_session_exercises_session ON session_exercises (training_session_id);
            CREATE INDEX IF NOT EXISTS idx_training_programs_profile ON training_programs (profile_id);
            CREATE INDEX IF NOT EXISTS idx_program_exercises_program ON program_exercises (program_id, day_of_week, position);
            CREATE INDEX IF NOT EXISTS idx_program_sessions_program_date ON program_sessions (program_id, date);
            "#,
        )?;

        Ok(())
    }

    /// Insert the built-in exercises into an empty catalog. Returns how many were added.
    pub fn seed_default_exercises(&mut self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        for (name, description, category, muscle_group) in DEFAULT_EXERCISES {
            tx.execute(
                "INSERT INTO exercises (name, description, category, muscle_group, is_custom) VALUES (?1, ?2, ?3, ?4, FALSE)",
                params![name, description, category, muscle_group],
            )?;
        }
        tx.commit()?;

        info!(count = DEFAULT_EXERCISES.len(), "Seeded default exercise catalog");
        Ok(DEFAULT_EXERCISES.len())
    }

    /// Get database statistics
    pub fn get_stats(&self) -> DbResult<DatabaseStats> {
        let count = |table: &str| -> DbResult<u64> {
            let count: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        };

        Ok(DatabaseStats {
            profile_count: count("profiles")?,
            exercise_count: count("exercises")?,
            training_record_count: count("training_records")?,
            session_count: count("training_sessions")?,
            program_count: count("training_programs")?,
        })
    }

    /// Fail with `NotFound` unless `id` exists in `table` and belongs to `profile_id`
    fn ensure_owned(&self, table: &'static str, id: i64, profile_id: i64) -> DbResult<()> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1 AND profile_id = ?2", table),
                params![id, profile_id],
                |_| Ok(()),
            )
            .optional()?;
        found.ok_or(DatabaseError::NotFound { table, id })
    }

    fn ensure_profile(&self, profile_id: i64) -> DbResult<()> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM profiles WHERE id = ?1", params![profile_id], |_| Ok(()))
            .optional()?;
        found.ok_or(DatabaseError::NotFound {
            table: "profiles",
            id: profile_id,
        })
    }

    fn delete_owned(&mut self, table: &'static str, id: i64, profile_id: i64) -> DbResult<()> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND profile_id = ?2", table),
            params![id, profile_id],
        )?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound { table, id });
        }
        info!(table, id, profile_id, "Deleted record");
        Ok(())
    }

    /// Row `id` of `table` whose `parent_column` is `parent_id`
    fn child_row<T>(
        &self,
        table: &'static str,
        parent_column: &str,
        id: i64,
        parent_id: i64,
        from_row: fn(&Row) -> rusqlite::Result<T>,
    ) -> DbResult<T> {
        self.conn
            .query_row(
                &format!("SELECT * FROM {} WHERE id = ?1 AND {} = ?2", table, parent_column),
                params![id, parent_id],
                from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound { table, id })
    }

    fn delete_child(&mut self, table: &'static str, parent_column: &str, id: i64, parent_id: i64) -> DbResult<()> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND {} = ?2", table, parent_column),
            params![id, parent_id],
        )?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound { table, id });
        }
        info!(table, id, parent_id, "Deleted record");
        Ok(())
    }

    // ---- Profiles ----

    pub fn create_profile(&mut self, request: &ProfileRequest) -> DbResult<Profile> {
        let now = Utc::now();
        self.conn.execute(
            r#"
            INSERT INTO profiles (name, age, gender, weight, height, goal, experience, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                request.name.trim(),
                request.age,
                request.gender,
                request.weight.map(|w| w.to_string()),
                request.height,
                request.goal.map(|g| g.as_str()),
                request.experience,
                request.notes,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(profile_id = id, name = %request.name, "Created profile");
        self.get_profile(id)
    }

    pub fn get_profile(&self, id: i64) -> DbResult<Profile> {
        self.conn
            .query_row("SELECT * FROM profiles WHERE id = ?1", params![id], profile_from_row)
            .optional()?
            .ok_or(DatabaseError::NotFound { table: "profiles", id })
    }

    pub fn list_profiles(&self) -> DbResult<Vec<Profile>> {
        let mut stmt = self.conn.prepare("SELECT * FROM profiles ORDER BY id")?;
        let profiles = stmt
            .query_map([], profile_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    pub fn update_profile(&mut self, id: i64, request: &ProfileRequest) -> DbResult<Profile> {
        let updated = self.conn.execute(
            r#"
            UPDATE profiles
            SET name = ?2, age = ?3, gender = ?4, weight = ?5, height = ?6, goal = ?7,
                experience = ?8, notes = ?9, updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                id,
                request.name.trim(),
                request.age,
                request.gender,
                request.weight.map(|w| w.to_string()),
                request.height,
                request.goal.map(|g| g.as_str()),
                request.experience,
                request.notes,
                Utc::now(),
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound { table: "profiles", id });
        }
        info!(profile_id = id, "Updated profile");
        self.get_profile(id)
    }

    /// Delete a profile together with everything it owns
    pub fn delete_profile(&mut self, id: i64) -> DbResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound { table: "profiles", id });
        }
        info!(profile_id = id, "Deleted profile");
        Ok(())
    }

    // ---- Exercise catalog ----

    /// Add a custom exercise. Names are unique across the catalog.
    pub fn create_exercise(&mut self, request: &ExerciseRequest) -> DbResult<ExerciseCatalogEntry> {
        let name = request.name.trim();
        let exists = self
            .conn
            .query_row("SELECT 1 FROM exercises WHERE name = ?1", params![name], |_| Ok(()))
            .optional()?;
        if exists.is_some() {
            return Err(DatabaseError::Duplicate {
                table: "exercises",
                key: name.to_string(),
            });
        }

        self.conn.execute(
            "INSERT INTO exercises (name, description, category, muscle_group, is_custom) VALUES (?1, ?2, ?3, ?4, TRUE)",
            params![name, request.description, request.category, request.muscle_group],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(exercise_id = id, name, "Created custom exercise");

        self.conn
            .query_row("SELECT * FROM exercises WHERE id = ?1", params![id], exercise_from_row)
            .map_err(DatabaseError::from)
    }

    /// Built-in exercises first, then by category and name
    pub fn list_exercises(&self) -> DbResult<Vec<ExerciseCatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM exercises ORDER BY is_custom ASC, category ASC, name ASC")?;
        let exercises = stmt
            .query_map([], exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    /// The catalog indexed by name, as consumed by the analytics engine
    pub fn exercise_catalog(&self) -> DbResult<ExerciseCatalog> {
        Ok(index_catalog(self.list_exercises()?))
    }

    /// Delete a custom exercise. Built-in exercises cannot be deleted.
    pub fn delete_exercise(&mut self, id: i64) -> DbResult<()> {
        let is_custom: bool = self
            .conn
            .query_row("SELECT is_custom FROM exercises WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?
            .ok_or(DatabaseError::NotFound { table: "exercises", id })?;
        if !is_custom {
            return Err(DatabaseError::Forbidden(
                "Built-in exercises cannot be deleted".to_string(),
            ));
        }

        self.conn.execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        info!(exercise_id = id, "Deleted custom exercise");
        Ok(())
    }

    // ---- Legacy training records ----

    pub fn create_training_record(
        &mut self,
        profile_id: i64,
        request: &TrainingRecordRequest,
    ) -> DbResult<TrainingRecord> {
        self.ensure_profile(profile_id)?;
        let mut record = TrainingRecord::new(profile_id, request.exercise.trim());
        record.grid = request.grid;

        self.conn.execute(
            "INSERT INTO training_records (profile_id, exercise, weeks, grid) VALUES (?1, ?2, ?3, ?4)",
            params![
                profile_id,
                record.exercise,
                record.weeks,
                serde_json::to_string(&record.grid)?
            ],
        )?;
        record.id = self.conn.last_insert_rowid();
        info!(record_id = record.id, profile_id, exercise = %record.exercise, "Created training record");
        Ok(record)
    }

    pub fn get_training_record(&self, profile_id: i64, id: i64) -> DbResult<TrainingRecord> {
        self.conn
            .query_row(
                "SELECT * FROM training_records WHERE id = ?1 AND profile_id = ?2",
                params![id, profile_id],
                training_record_from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound {
                table: "training_records",
                id,
            })
    }

    /// All records of a profile in insertion order
    pub fn list_training_records(&self, profile_id: i64) -> DbResult<Vec<TrainingRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM training_records WHERE profile_id = ?1 ORDER BY id ASC")?;
        let records = stmt
            .query_map(params![profile_id], training_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(profile_id, count = records.len(), "Loaded training records");
        Ok(records)
    }

    pub fn update_training_record(&mut self, profile_id: i64, record: &TrainingRecord) -> DbResult<()> {
        let updated = self.conn.execute(
            "UPDATE training_records SET exercise = ?3, grid = ?4 WHERE id = ?1 AND profile_id = ?2",
            params![
                record.id,
                profile_id,
                record.exercise,
                serde_json::to_string(&record.grid)?
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                table: "training_records",
                id: record.id,
            });
        }
        info!(record_id = record.id, profile_id, "Updated training record");
        Ok(())
    }

    pub fn delete_training_record(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("training_records", id, profile_id)
    }

    /// Sorted distinct non-empty exercise names a profile has logged
    pub fn profile_exercises(&self, profile_id: i64) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT exercise FROM training_records WHERE profile_id = ?1 AND exercise != '' ORDER BY exercise",
        )?;
        let names = stmt
            .query_map(params![profile_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    // ---- Body weight ----

    pub fn add_body_weight(&mut self, profile_id: i64, request: &BodyWeightRequest) -> DbResult<BodyWeightEntry> {
        self.ensure_profile(profile_id)?;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());

        self.conn.execute(
            r#"
            INSERT INTO body_weights (profile_id, date, weight, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![profile_id, date, request.weight.to_string(), request.notes, now],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(entry_id = id, profile_id, weight = %request.weight, "Recorded body weight");

        Ok(BodyWeightEntry {
            id,
            profile_id,
            date,
            weight: request.weight,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Newest first
    pub fn list_body_weights(&self, profile_id: i64) -> DbResult<Vec<BodyWeightEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM body_weights WHERE profile_id = ?1 ORDER BY date DESC, id DESC")?;
        let entries = stmt
            .query_map(params![profile_id], body_weight_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_body_weight(&self, profile_id: i64, id: i64) -> DbResult<BodyWeightEntry> {
        self.conn
            .query_row(
                "SELECT * FROM body_weights WHERE id = ?1 AND profile_id = ?2",
                params![id, profile_id],
                body_weight_from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound {
                table: "body_weights",
                id,
            })
    }

    /// Replace weight and notes. A missing date keeps the recorded one.
    pub fn update_body_weight(
        &mut self,
        profile_id: i64,
        id: i64,
        request: &BodyWeightRequest,
    ) -> DbResult<BodyWeightEntry> {
        let entry = self.get_body_weight(profile_id, id)?;
        let now = Utc::now();
        let date = request.date.unwrap_or(entry.date);

        self.conn.execute(
            "UPDATE body_weights SET date = ?2, weight = ?3, notes = ?4, updated_at = ?5 WHERE id = ?1",
            params![id, date, request.weight.to_string(), request.notes, now],
        )?;
        info!(entry_id = id, profile_id, weight = %request.weight, "Updated body weight");

        Ok(BodyWeightEntry {
            date,
            weight: request.weight,
            notes: request.notes.clone(),
            updated_at: now,
            ..entry
        })
    }

    pub fn delete_body_weight(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("body_weights", id, profile_id)
    }

    // ---- Personal records ----

    pub fn add_personal_record(
        &mut self,
        profile_id: i64,
        request: &PersonalRecordRequest,
    ) -> DbResult<PersonalRecord> {
        self.ensure_profile(profile_id)?;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());

        self.conn.execute(
            r#"
            INSERT INTO personal_records (profile_id, exercise, weight, reps, date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                profile_id,
                request.exercise.trim(),
                request.weight.to_string(),
                request.reps,
                date,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(record_id = id, profile_id, exercise = %request.exercise, "Recorded personal record");

        Ok(PersonalRecord {
            id,
            profile_id,
            exercise: request.exercise.trim().to_string(),
            weight: request.weight,
            reps: request.reps,
            date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Newest first
    pub fn list_personal_records(&self, profile_id: i64) -> DbResult<Vec<PersonalRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM personal_records WHERE profile_id = ?1 ORDER BY date DESC, id DESC")?;
        let records = stmt
            .query_map(params![profile_id], personal_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn delete_personal_record(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("personal_records", id, profile_id)
    }

    // ---- Goals ----

    pub fn create_goal(&mut self, profile_id: i64, request: &GoalRequest) -> DbResult<Goal> {
        self.ensure_profile(profile_id)?;
        let mut goal = goals::new_goal(profile_id, request, self.locale, Utc::now());

        self.conn.execute(
            r#"
            INSERT INTO goals (
                profile_id, title, description, goal_type, exercise, target_value, current_value,
                unit, target_date, achieved, achieved_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                goal.profile_id,
                goal.title,
                goal.description,
                goal.goal_type.as_str(),
                goal.exercise,
                goal.target_value.to_string(),
                goal.current_value.to_string(),
                goal.unit,
                goal.target_date,
                goal.achieved,
                goal.achieved_date,
                goal.created_at,
                goal.updated_at,
            ],
        )?;
        goal.id = self.conn.last_insert_rowid();
        info!(goal_id = goal.id, profile_id, title = %goal.title, "Created goal");
        Ok(goal)
    }

    pub fn get_goal(&self, profile_id: i64, id: i64) -> DbResult<Goal> {
        self.conn
            .query_row(
                "SELECT * FROM goals WHERE id = ?1 AND profile_id = ?2",
                params![id, profile_id],
                goal_from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound { table: "goals", id })
    }

    /// Newest first
    pub fn list_goals(&self, profile_id: i64) -> DbResult<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM goals WHERE profile_id = ?1 ORDER BY created_at DESC, id DESC")?;
        let list = stmt
            .query_map(params![profile_id], goal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    /// Set the current value of a goal, marking it achieved when it reaches the target
    pub fn update_goal_progress(
        &mut self,
        profile_id: i64,
        id: i64,
        request: &GoalProgressRequest,
    ) -> DbResult<Goal> {
        let mut goal = self.get_goal(profile_id, id)?;
        goals::record_progress(&mut goal, request.current_value, Utc::now());

        self.conn.execute(
            r#"
            UPDATE goals SET current_value = ?2, achieved = ?3, achieved_date = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                goal.id,
                goal.current_value.to_string(),
                goal.achieved,
                goal.achieved_date,
                goal.updated_at
            ],
        )?;
        info!(goal_id = id, current = %goal.current_value, achieved = goal.achieved, "Updated goal progress");
        Ok(goal)
    }

    /// Rewrite a goal's definition, keeping its progress
    pub fn update_goal(&mut self, profile_id: i64, id: i64, request: &GoalRequest) -> DbResult<Goal> {
        let mut goal = self.get_goal(profile_id, id)?;
        goals::apply_update(&mut goal, request, Utc::now());

        self.conn.execute(
            r#"
            UPDATE goals SET
                title = ?2, description = ?3, goal_type = ?4, exercise = ?5, target_value = ?6,
                unit = ?7, target_date = ?8, achieved = ?9, achieved_date = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                goal.id,
                goal.title,
                goal.description,
                goal.goal_type.as_str(),
                goal.exercise,
                goal.target_value.to_string(),
                goal.unit,
                goal.target_date,
                goal.achieved,
                goal.achieved_date,
                goal.updated_at,
            ],
        )?;
        info!(goal_id = id, profile_id, title = %goal.title, achieved = goal.achieved, "Updated goal");
        Ok(goal)
    }

    pub fn delete_goal(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("goals", id, profile_id)
    }

    // ---- Training sessions ----

    /// Create a session. Missing date means today; ratings outside 1-10 get defaults.
    pub fn create_session(&mut self, profile_id: i64, request: &TrainingSessionRequest) -> DbResult<TrainingSession> {
        self.ensure_profile(profile_id)?;
        let now = Utc::now();
        let session = TrainingSession {
            id: 0,
            profile_id,
            date: request.date.unwrap_or_else(|| now.date_naive()),
            duration: request.duration,
            notes: request.notes.clone(),
            energy: clamp_rating(request.energy, DEFAULT_RATING),
            mood: clamp_rating(request.mood, DEFAULT_RATING),
            soreness: clamp_rating(request.soreness, DEFAULT_SORENESS),
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            r#"
            INSERT INTO training_sessions (profile_id, date, duration, notes, energy, mood, soreness, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                profile_id,
                session.date,
                session.duration,
                session.notes,
                session.energy,
                session.mood,
                session.soreness,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(session_id = id, profile_id, date = %session.date, "Created training session");
        Ok(TrainingSession { id, ..session })
    }

    pub fn add_session_exercise(
        &mut self,
        profile_id: i64,
        session_id: i64,
        request: &SessionExerciseRequest,
    ) -> DbResult<SessionExercise> {
        self.ensure_owned("training_sessions", session_id, profile_id)?;
        let now = Utc::now();

        self.conn.execute(
            r#"
            INSERT INTO session_exercises (training_session_id, exercise, sets, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                session_id,
                request.exercise.trim(),
                serde_json::to_string(&request.sets)?,
                request.notes,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(session_id, exercise = %request.exercise, sets = request.sets.len(), "Added exercise to session");

        Ok(SessionExercise {
            id,
            training_session_id: session_id,
            exercise: request.exercise.trim().to_string(),
            sets: request.sets.clone(),
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn session_exercises(&self, session_id: i64) -> DbResult<Vec<SessionExercise>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM session_exercises WHERE training_session_id = ?1 ORDER BY id")?;
        let exercises = stmt
            .query_map(params![session_id], session_exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn get_session(&self, profile_id: i64, id: i64) -> DbResult<TrainingSessionWithExercises> {
        let session = self
            .conn
            .query_row(
                "SELECT * FROM training_sessions WHERE id = ?1 AND profile_id = ?2",
                params![id, profile_id],
                session_from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound {
                table: "training_sessions",
                id,
            })?;
        let exercises = self.session_exercises(id)?;
        Ok(TrainingSessionWithExercises { session, exercises })
    }

    /// One page of sessions, newest first, optionally limited to a date range
    pub fn training_history(&self, profile_id: i64, query: &HistoryQuery) -> DbResult<TrainingHistory> {
        let pagination = query.pagination;

        let total: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM training_sessions
            WHERE profile_id = ?1 AND (?2 IS NULL OR date >= ?2) AND (?3 IS NULL OR date <= ?3)
            "#,
            params![profile_id, query.date_from, query.date_to],
            |row| row.get(0),
        )?;
        let total = total.max(0) as u64;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT * FROM training_sessions
            WHERE profile_id = ?1 AND (?2 IS NULL OR date >= ?2) AND (?3 IS NULL OR date <= ?3)
            ORDER BY date DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )?;
        let sessions = stmt
            .query_map(
                params![
                    profile_id,
                    query.date_from,
                    query.date_to,
                    i64::from(pagination.page_size),
                    pagination.offset() as i64
                ],
                session_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let sessions = sessions
            .into_iter()
            .map(|session| {
                let exercises = self.session_exercises(session.id)?;
                Ok(TrainingSessionWithExercises { session, exercises })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(TrainingHistory {
            sessions,
            total_count: total,
            page: pagination.page,
            page_size: pagination.page_size,
            has_more: pagination.has_more(total),
        })
    }

    /// Delete a session and its exercises
    pub fn delete_session(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("training_sessions", id, profile_id)
    }

    /// Rewrite a session's header. A missing date keeps the recorded one.
    pub fn update_session(
        &mut self,
        profile_id: i64,
        id: i64,
        request: &TrainingSessionRequest,
    ) -> DbResult<TrainingSession> {
        let current = self.get_session(profile_id, id)?.session;
        let now = Utc::now();
        let session = TrainingSession {
            date: request.date.unwrap_or(current.date),
            duration: request.duration,
            notes: request.notes.clone(),
            energy: clamp_rating(request.energy, DEFAULT_RATING),
            mood: clamp_rating(request.mood, DEFAULT_RATING),
            soreness: clamp_rating(request.soreness, DEFAULT_SORENESS),
            updated_at: now,
            ..current
        };

        self.conn.execute(
            r#"
            UPDATE training_sessions
            SET date = ?2, duration = ?3, notes = ?4, energy = ?5, mood = ?6, soreness = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                id,
                session.date,
                session.duration,
                session.notes,
                session.energy,
                session.mood,
                session.soreness,
                now
            ],
        )?;
        info!(session_id = id, profile_id, date = %session.date, "Updated training session");
        Ok(session)
    }

    pub fn update_session_exercise(
        &mut self,
        profile_id: i64,
        session_id: i64,
        id: i64,
        request: &SessionExerciseRequest,
    ) -> DbResult<SessionExercise> {
        self.ensure_owned("training_sessions", session_id, profile_id)?;

        let updated = self.conn.execute(
            r#"
            UPDATE session_exercises SET exercise = ?3, sets = ?4, notes = ?5, updated_at = ?6
            WHERE id = ?1 AND training_session_id = ?2
            "#,
            params![
                id,
                session_id,
                request.exercise.trim(),
                serde_json::to_string(&request.sets)?,
                request.notes,
                Utc::now()
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                table: "session_exercises",
                id,
            });
        }
        info!(session_id, exercise_id = id, sets = request.sets.len(), "Updated session exercise");
        self.child_row("session_exercises", "training_session_id", id, session_id, session_exercise_from_row)
    }

    pub fn delete_session_exercise(&mut self, profile_id: i64, session_id: i64, id: i64) -> DbResult<()> {
        self.ensure_owned("training_sessions", session_id, profile_id)?;
        self.delete_child("session_exercises", "training_session_id", id, session_id)
    }

    // ---- Programs ----

    /// Create a program. An active program deactivates the profile's others.
    pub fn create_program(&mut self, profile_id: i64, request: &TrainingProgramRequest) -> DbResult<TrainingProgram> {
        self.ensure_profile(profile_id)?;
        let now = Utc::now();

        let tx = self.conn.transaction()?;
        if request.is_active {
            tx.execute(
                "UPDATE training_programs SET is_active = FALSE, updated_at = ?2 WHERE profile_id = ?1",
                params![profile_id, now],
            )?;
        }
        tx.execute(
            r#"
            INSERT INTO training_programs (profile_id, name, description, start_date, end_date, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                profile_id,
                request.name.trim(),
                request.description,
                request.start_date,
                request.end_date,
                request.is_active,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(program_id = id, profile_id, name = %request.name, active = request.is_active, "Created training program");
        self.get_program(profile_id, id)
    }

    pub fn get_program(&self, profile_id: i64, id: i64) -> DbResult<TrainingProgram> {
        self.conn
            .query_row(
                "SELECT * FROM training_programs WHERE id = ?1 AND profile_id = ?2",
                params![id, profile_id],
                program_from_row,
            )
            .optional()?
            .ok_or(DatabaseError::NotFound {
                table: "training_programs",
                id,
            })
    }

    /// Newest first
    pub fn list_programs(&self, profile_id: i64) -> DbResult<Vec<TrainingProgram>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM training_programs WHERE profile_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let programs = stmt
            .query_map(params![profile_id], program_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(programs)
    }

    /// Make `id` the profile's only active program
    pub fn activate_program(&mut self, profile_id: i64, id: i64) -> DbResult<TrainingProgram> {
        self.ensure_owned("training_programs", id, profile_id)?;
        let now = Utc::now();

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE training_programs SET is_active = (id = ?2), updated_at = ?3 WHERE profile_id = ?1",
            params![profile_id, id, now],
        )?;
        tx.commit()?;

        info!(program_id = id, profile_id, "Activated training program");
        self.get_program(profile_id, id)
    }

    /// Rewrite a program. Marking it active deactivates the profile's others.
    pub fn update_program(
        &mut self,
        profile_id: i64,
        id: i64,
        request: &TrainingProgramRequest,
    ) -> DbResult<TrainingProgram> {
        self.ensure_owned("training_programs", id, profile_id)?;
        let now = Utc::now();

        let tx = self.conn.transaction()?;
        if request.is_active {
            tx.execute(
                "UPDATE training_programs SET is_active = FALSE, updated_at = ?3 WHERE profile_id = ?1 AND id != ?2",
                params![profile_id, id, now],
            )?;
        }
        tx.execute(
            r#"
            UPDATE training_programs
            SET name = ?2, description = ?3, start_date = ?4, end_date = ?5, is_active = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                request.name.trim(),
                request.description,
                request.start_date,
                request.end_date,
                request.is_active,
                now
            ],
        )?;
        tx.commit()?;

        info!(program_id = id, profile_id, name = %request.name, active = request.is_active, "Updated training program");
        self.get_program(profile_id, id)
    }

    /// Delete a program with its exercises and sessions
    pub fn delete_program(&mut self, profile_id: i64, id: i64) -> DbResult<()> {
        self.delete_owned("training_programs", id, profile_id)
    }

    pub fn add_program_exercise(
        &mut self,
        profile_id: i64,
        program_id: i64,
        request: &ProgramExerciseRequest,
    ) -> DbResult<ProgramExercise> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        let now = Utc::now();

        self.conn.execute(
            r#"
            INSERT INTO program_exercises (program_id, exercise, day_of_week, position, sets, reps, weight, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                program_id,
                request.exercise.trim(),
                request.day_of_week,
                request.order,
                request.sets,
                request.reps,
                request.weight.to_string(),
                request.notes,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(program_id, exercise = %request.exercise, day = request.day_of_week, "Added program exercise");

        Ok(ProgramExercise {
            id,
            program_id,
            exercise: request.exercise.trim().to_string(),
            day_of_week: request.day_of_week,
            order: request.order,
            sets: request.sets,
            reps: request.reps,
            weight: request.weight,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Ordered by weekday, then position within the day
    pub fn list_program_exercises(&self, profile_id: i64, program_id: i64) -> DbResult<Vec<ProgramExercise>> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT * FROM program_exercises WHERE program_id = ?1 ORDER BY day_of_week ASC, position ASC, id ASC",
        )?;
        let exercises = stmt
            .query_map(params![program_id], program_exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn update_program_exercise(
        &mut self,
        profile_id: i64,
        program_id: i64,
        id: i64,
        request: &ProgramExerciseRequest,
    ) -> DbResult<ProgramExercise> {
        self.ensure_owned("training_programs", program_id, profile_id)?;

        let updated = self.conn.execute(
            r#"
            UPDATE program_exercises
            SET exercise = ?3, day_of_week = ?4, position = ?5, sets = ?6, reps = ?7, weight = ?8, notes = ?9, updated_at = ?10
            WHERE id = ?1 AND program_id = ?2
            "#,
            params![
                id,
                program_id,
                request.exercise.trim(),
                request.day_of_week,
                request.order,
                request.sets,
                request.reps,
                request.weight.to_string(),
                request.notes,
                Utc::now()
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                table: "program_exercises",
                id,
            });
        }
        info!(program_id, exercise_id = id, day = request.day_of_week, "Updated program exercise");
        self.child_row("program_exercises", "program_id", id, program_id, program_exercise_from_row)
    }

    pub fn delete_program_exercise(&mut self, profile_id: i64, program_id: i64, id: i64) -> DbResult<()> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        self.delete_child("program_exercises", "program_id", id, program_id)
    }

    pub fn log_program_session(
        &mut self,
        profile_id: i64,
        program_id: i64,
        request: &ProgramSessionRequest,
    ) -> DbResult<ProgramSession> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());

        self.conn.execute(
            r#"
            INSERT INTO program_sessions (program_id, date, completed, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![program_id, date, request.completed, request.notes, now],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(program_id, date = %date, completed = request.completed, "Logged program session");

        Ok(ProgramSession {
            id,
            program_id,
            date,
            completed: request.completed,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Sessions of a program in date order, optionally within `[from, to]`
    pub fn list_program_sessions(
        &self,
        profile_id: i64,
        program_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> DbResult<Vec<ProgramSession>> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        let (from, to) = match range {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        let mut stmt = self.conn.prepare(
            r#"
            SELECT * FROM program_sessions
            WHERE program_id = ?1 AND (?2 IS NULL OR date >= ?2) AND (?3 IS NULL OR date <= ?3)
            ORDER BY date ASC, id ASC
            "#,
        )?;
        let sessions = stmt
            .query_map(params![program_id, from, to], program_session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    /// A missing date keeps the logged one
    pub fn update_program_session(
        &mut self,
        profile_id: i64,
        program_id: i64,
        id: i64,
        request: &ProgramSessionRequest,
    ) -> DbResult<ProgramSession> {
        self.ensure_owned("training_programs", program_id, profile_id)?;

        let updated = self.conn.execute(
            r#"
            UPDATE program_sessions SET date = COALESCE(?3, date), completed = ?4, notes = ?5, updated_at = ?6
            WHERE id = ?1 AND program_id = ?2
            "#,
            params![id, program_id, request.date, request.completed, request.notes, Utc::now()],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                table: "program_sessions",
                id,
            });
        }
        info!(program_id, session_id = id, completed = request.completed, "Updated program session");
        self.child_row("program_sessions", "program_id", id, program_id, program_session_from_row)
    }

    pub fn delete_program_session(&mut self, profile_id: i64, program_id: i64, id: i64) -> DbResult<()> {
        self.ensure_owned("training_programs", program_id, profile_id)?;
        self.delete_child("program_sessions", "program_id", id, program_id)
    }
}

fn conversion_error<E>(row: &Row, column: &str, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn decimal_column(row: &Row, column: &str) -> rusqlite::Result<Decimal> {
    let text: String = row.get(column)?;
    text.parse::<Decimal>()
        .map_err(|e| conversion_error(row, column, e))
}

fn json_column<T: DeserializeOwned>(row: &Row, column: &str) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(row, column, e))
}

fn profile_from_row(row: &Row) -> rusqlite::Result<Profile> {
    let weight = match row.get::<_, Option<String>>("weight")? {
        Some(text) => Some(
            text.parse::<Decimal>()
                .map_err(|e| conversion_error(row, "weight", e))?,
        ),
        None => None,
    };
    let goal = match row.get::<_, Option<String>>("goal")? {
        Some(text) => Some(
            text.parse::<FitnessGoal>()
                .map_err(|e| conversion_error(row, "goal", e))?,
        ),
        None => None,
    };

    Ok(Profile {
        id: row.get("id")?,
        name: row.get("name")?,
        age: row.get("age")?,
        gender: row.get("gender")?,
        weight,
        height: row.get("height")?,
        goal,
        experience: row.get("experience")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn exercise_from_row(row: &Row) -> rusqlite::Result<ExerciseCatalogEntry> {
    Ok(ExerciseCatalogEntry {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        muscle_group: row.get("muscle_group")?,
        is_custom: row.get("is_custom")?,
    })
}

fn training_record_from_row(row: &Row) -> rusqlite::Result<TrainingRecord> {
    Ok(TrainingRecord {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        exercise: row.get("exercise")?,
        weeks: row.get("weeks")?,
        grid: json_column(row, "grid")?,
    })
}

fn body_weight_from_row(row: &Row) -> rusqlite::Result<BodyWeightEntry> {
    Ok(BodyWeightEntry {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        date: row.get("date")?,
        weight: decimal_column(row, "weight")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn personal_record_from_row(row: &Row) -> rusqlite::Result<PersonalRecord> {
    Ok(PersonalRecord {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        exercise: row.get("exercise")?,
        weight: decimal_column(row, "weight")?,
        reps: row.get("reps")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn goal_from_row(row: &Row) -> rusqlite::Result<Goal> {
    let goal_type: String = row.get("goal_type")?;
    Ok(Goal {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        goal_type: goal_type
            .parse::<GoalType>()
            .map_err(|e| conversion_error(row, "goal_type", e))?,
        exercise: row.get("exercise")?,
        target_value: decimal_column(row, "target_value")?,
        current_value: decimal_column(row, "current_value")?,
        unit: row.get("unit")?,
        target_date: row.get("target_date")?,
        achieved: row.get("achieved")?,
        achieved_date: row.get("achieved_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn session_from_row(row: &Row) -> rusqlite::Result<TrainingSession> {
    Ok(TrainingSession {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        date: row.get("date")?,
        duration: row.get("duration")?,
        notes: row.get("notes")?,
        energy: row.get("energy")?,
        mood: row.get("mood")?,
        soreness: row.get("soreness")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn session_exercise_from_row(row: &Row) -> rusqlite::Result<SessionExercise> {
    Ok(SessionExercise {
        id: row.get("id")?,
        training_session_id: row.get("training_session_id")?,
        exercise: row.get("exercise")?,
        sets: json_column(row, "sets")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn program_from_row(row: &Row) -> rusqlite::Result<TrainingProgram> {
    Ok(TrainingProgram {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn program_exercise_from_row(row: &Row) -> rusqlite::Result<ProgramExercise> {
    Ok(ProgramExercise {
        id: row.get("id")?,
        program_id: row.get("program_id")?,
        exercise: row.get("exercise")?,
        day_of_week: row.get("day_of_week")?,
        order: row.get("position")?,
        sets: row.get("sets")?,
        reps: row.get("reps")?,
        weight: decimal_column(row, "weight")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn program_session_from_row(row: &Row) -> rusqlite::Result<ProgramSession> {
    Ok(ProgramSession {
        id: row.get("id")?,
        program_id: row.get("program_id")?,
        date: row.get("date")?,
        completed: row.get("completed")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GridCell, TrainingGrid, WorkingSet};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn create_profile(db: &mut Database, name: &str) -> Profile {
        db.create_profile(&ProfileRequest {
            name: name.to_string(),
            weight: Some(dec!(82.5)),
            height: Some(180),
            goal: Some(FitnessGoal::Strength),
            ..ProfileRequest::default()
        })
        .unwrap()
    }

    fn program_request(name: &str, active: bool) -> TrainingProgramRequest {
        TrainingProgramRequest {
            name: name.to_string(),
            description: String::new(),
            start_date: date(2024, 3, 1),
            end_date: date(2024, 5, 31),
            is_active: active,
        }
    }

    #[test]
    fn test_database_creation_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("liftlog.db");

        {
            let mut db = Database::new(&path).unwrap();
            create_profile(&mut db, "Disk");
        }

        let db = Database::new(&path).unwrap();
        let profiles = db.list_profiles().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Disk");
        assert_eq!(profiles[0].weight, Some(dec!(82.5)));
        assert_eq!(profiles[0].goal, Some(FitnessGoal::Strength));
    }

    #[test]
    fn test_default_catalog_seeded_once() {
        let mut db = create_test_db();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.exercise_count as usize, DEFAULT_EXERCISES.len());
        assert_eq!(db.seed_default_exercises().unwrap(), 0);

        let catalog = db.exercise_catalog().unwrap();
        assert_eq!(catalog["Приседания со штангой"].muscle_group, "Ноги");
    }

    #[test]
    fn test_custom_exercises() {
        let mut db = create_test_db();
        let request = ExerciseRequest {
            name: "Zercher Squat".to_string(),
            category: "Базовое".to_string(),
            muscle_group: "Ноги".to_string(),
            ..ExerciseRequest::default()
        };
        let custom = db.create_exercise(&request).unwrap();
        assert!(custom.is_custom);

        assert!(matches!(
            db.create_exercise(&request),
            Err(DatabaseError::Duplicate { table: "exercises", .. })
        ));

        let exercises = db.list_exercises().unwrap();
        assert_eq!(exercises.last().unwrap().name, "Zercher Squat");
        assert!(!exercises[0].is_custom);

        let builtin_id = exercises[0].id;
        assert!(matches!(db.delete_exercise(builtin_id), Err(DatabaseError::Forbidden(_))));
        db.delete_exercise(custom.id).unwrap();
        assert!(matches!(
            db.delete_exercise(custom.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn test_training_records_round_trip_in_order() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "Lifter");

        let mut grid = TrainingGrid::default();
        grid.set_cell(1, 1, GridCell::new(5, 100)).unwrap();
        grid.set_cell(4, 6, GridCell::new(3, 120)).unwrap();

        for exercise in ["Squat", "Bench", "Squat", ""] {
            db.create_training_record(
                profile.id,
                &TrainingRecordRequest {
                    exercise: exercise.to_string(),
                    grid,
                },
            )
            .unwrap();
        }

        let records = db.list_training_records(profile.id).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.exercise.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Bench", "Squat", ""]);
        assert_eq!(records[0].grid, grid);
        assert_eq!(records[0].grid.cell(4, 6), Some(GridCell::new(3, 120)));

        assert_eq!(db.profile_exercises(profile.id).unwrap(), vec!["Bench", "Squat"]);
    }

    #[test]
    fn test_update_training_record() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "Lifter");
        let mut record = db
            .create_training_record(
                profile.id,
                &TrainingRecordRequest {
                    exercise: "Row".to_string(),
                    grid: TrainingGrid::default(),
                },
            )
            .unwrap();

        record.grid.set_cell(2, 3, GridCell::new(10, 60)).unwrap();
        db.update_training_record(profile.id, &record).unwrap();
        let loaded = db.get_training_record(profile.id, record.id).unwrap();
        assert_eq!(loaded.grid.cell(2, 3), Some(GridCell::new(10, 60)));

        let other = create_profile(&mut db, "Other");
        assert!(db.update_training_record(other.id, &record).is_err());
    }

    #[test]
    fn test_records_require_existing_profile() {
        let mut db = create_test_db();
        let result = db.add_body_weight(
            42,
            &BodyWeightRequest {
                weight: dec!(80),
                notes: String::new(),
                date: None,
            },
        );
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { table: "profiles", id: 42 })
        ));
    }

    #[test]
    fn test_body_weights_newest_first_and_owned() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");

        for (day, weight) in [(1, dec!(80.2)), (15, dec!(79.4)), (8, dec!(79.9))] {
            db.add_body_weight(
                profile.id,
                &BodyWeightRequest {
                    weight,
                    notes: String::new(),
                    date: Some(date(2024, 4, day)),
                },
            )
            .unwrap();
        }

        let entries = db.list_body_weights(profile.id).unwrap();
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2024, 4, 15), date(2024, 4, 8), date(2024, 4, 1)]);
        assert_eq!(entries[0].weight, dec!(79.4));

        assert!(matches!(
            db.delete_body_weight(other.id, entries[0].id),
            Err(DatabaseError::NotFound { table: "body_weights", .. })
        ));
        db.delete_body_weight(profile.id, entries[0].id).unwrap();
        assert_eq!(db.list_body_weights(profile.id).unwrap().len(), 2);
    }

    #[test]
    fn test_personal_records() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let pr = db
            .add_personal_record(
                profile.id,
                &PersonalRecordRequest {
                    exercise: " Deadlift ".to_string(),
                    weight: dec!(200),
                    reps: 1,
                    date: None,
                },
            )
            .unwrap();
        assert_eq!(pr.exercise, "Deadlift");
        assert_eq!(pr.date, Utc::now().date_naive());

        let records = db.list_personal_records(profile.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weight, dec!(200));
        assert_eq!(records[0].date, pr.date);
        db.delete_personal_record(profile.id, pr.id).unwrap();
        assert!(db.list_personal_records(profile.id).unwrap().is_empty());
    }

    #[test]
    fn test_goal_lifecycle() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");

        let goal = db
            .create_goal(
                profile.id,
                &GoalRequest {
                    title: "Bench 100".to_string(),
                    description: String::new(),
                    goal_type: GoalType::Weight,
                    exercise: "Bench".to_string(),
                    target_value: dec!(100),
                    unit: String::new(),
                    target_date: Some(date(2024, 12, 31)),
                },
            )
            .unwrap();
        assert_eq!(goal.unit, "кг");
        assert!(!goal.achieved);

        assert!(db.get_goal(other.id, goal.id).unwrap_err().to_string().contains("goals"));

        let goal = db
            .update_goal_progress(profile.id, goal.id, &GoalProgressRequest { current_value: dec!(95) })
            .unwrap();
        assert!(!goal.achieved);

        let goal = db
            .update_goal_progress(profile.id, goal.id, &GoalProgressRequest { current_value: dec!(102.5) })
            .unwrap();
        assert!(goal.achieved);
        assert!(goal.achieved_date.is_some());

        let stored = db.get_goal(profile.id, goal.id).unwrap();
        assert!(stored.achieved);
        assert_eq!(stored.current_value, dec!(102.5));
        assert_eq!(stored.target_date, date(2024, 12, 31));

        db.delete_goal(profile.id, goal.id).unwrap();
        assert!(db.list_goals(profile.id).unwrap().is_empty());
    }

    #[test]
    fn test_sessions_defaults_and_history() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");

        let session = db
            .create_session(
                profile.id,
                &TrainingSessionRequest {
                    date: Some(date(2024, 5, 1)),
                    duration: 60,
                    energy: 0,
                    mood: 8,
                    soreness: 42,
                    ..TrainingSessionRequest::default()
                },
            )
            .unwrap();
        assert_eq!(session.energy, 5);
        assert_eq!(session.mood, 8);
        assert_eq!(session.soreness, 1);

        db.add_session_exercise(
            profile.id,
            session.id,
            &SessionExerciseRequest {
                exercise: "Squat".to_string(),
                sets: vec![
                    WorkingSet { weight: dec!(100), reps: 5, rpe: 8 },
                    WorkingSet { weight: dec!(105), reps: 3, rpe: 9 },
                ],
                notes: String::new(),
            },
        )
        .unwrap();

        for day in 2..=5 {
            db.create_session(
                profile.id,
                &TrainingSessionRequest {
                    date: Some(date(2024, 5, day)),
                    ..TrainingSessionRequest::default()
                },
            )
            .unwrap();
        }

        let page = db
            .training_history(
                profile.id,
                &HistoryQuery {
                    pagination: Pagination::new(1, 2),
                    ..HistoryQuery::default()
                },
            )
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.sessions.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.sessions[0].session.date, date(2024, 5, 5));

        let last = db
            .training_history(
                profile.id,
                &HistoryQuery {
                    pagination: Pagination::new(3, 2),
                    ..HistoryQuery::default()
                },
            )
            .unwrap();
        assert_eq!(last.sessions.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.sessions[0].exercises[0].sets.len(), 2);
        assert_eq!(last.sessions[0].exercises[0].sets[1].weight, dec!(105));

        let ranged = db
            .training_history(
                profile.id,
                &HistoryQuery {
                    pagination: Pagination::default(),
                    date_from: Some(date(2024, 5, 2)),
                    date_to: Some(date(2024, 5, 3)),
                },
            )
            .unwrap();
        assert_eq!(ranged.total_count, 2);

        db.delete_session(profile.id, session.id).unwrap();
        assert!(db.get_session(profile.id, session.id).is_err());
    }

    #[test]
    fn test_session_exercise_requires_owned_session() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");
        let session = db
            .create_session(profile.id, &TrainingSessionRequest::default())
            .unwrap();

        let result = db.add_session_exercise(
            other.id,
            session.id,
            &SessionExerciseRequest {
                exercise: "Row".to_string(),
                ..SessionExerciseRequest::default()
            },
        );
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { table: "training_sessions", .. })
        ));
    }

    #[test]
    fn test_single_active_program() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");

        let first = db.create_program(profile.id, &program_request("First", true)).unwrap();
        let second = db.create_program(profile.id, &program_request("Second", true)).unwrap();
        assert!(!db.get_program(profile.id, first.id).unwrap().is_active);
        assert!(second.is_active);

        let first = db.activate_program(profile.id, first.id).unwrap();
        assert!(first.is_active);
        assert!(!db.get_program(profile.id, second.id).unwrap().is_active);

        let active: Vec<_> = db
            .list_programs(profile.id)
            .unwrap()
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn test_program_children_and_cascade() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let program = db.create_program(profile.id, &program_request("Block", false)).unwrap();

        for (name, day, order) in [("Row", 3, 2), ("Squat", 1, 1), ("Bench", 3, 1)] {
            db.add_program_exercise(
                profile.id,
                program.id,
                &ProgramExerciseRequest {
                    exercise: name.to_string(),
                    day_of_week: day,
                    order,
                    sets: 3,
                    reps: 8,
                    weight: dec!(60),
                    notes: String::new(),
                },
            )
            .unwrap();
        }
        let names: Vec<String> = db
            .list_program_exercises(profile.id, program.id)
            .unwrap()
            .into_iter()
            .map(|e| e.exercise)
            .collect();
        assert_eq!(names, vec!["Squat", "Bench", "Row"]);

        for day in [20, 5, 40] {
            let date = date(2024, 3, 1) + chrono::Days::new(day);
            db.log_program_session(
                profile.id,
                program.id,
                &ProgramSessionRequest {
                    date: Some(date),
                    completed: true,
                    notes: String::new(),
                },
            )
            .unwrap();
        }
        let march = db
            .list_program_sessions(profile.id, program.id, Some((date(2024, 3, 1), date(2024, 3, 31))))
            .unwrap();
        assert_eq!(march.len(), 2);
        assert!(march[0].date < march[1].date);
        assert_eq!(db.list_program_sessions(profile.id, program.id, None).unwrap().len(), 3);

        db.delete_program(profile.id, program.id).unwrap();
        let remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM program_exercises", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        let remaining: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM program_sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_delete_profile_cascades() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        db.create_training_record(
            profile.id,
            &TrainingRecordRequest {
                exercise: "Squat".to_string(),
                grid: TrainingGrid::default(),
            },
        )
        .unwrap();
        db.create_session(profile.id, &TrainingSessionRequest::default()).unwrap();
        db.create_program(profile.id, &program_request("Block", true)).unwrap();

        db.delete_profile(profile.id).unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.profile_count, 0);
        assert_eq!(stats.training_record_count, 0);
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.program_count, 0);
        assert!(matches!(
            db.delete_profile(profile.id),
            Err(DatabaseError::NotFound { table: "profiles", .. })
        ));
    }

    #[test]
    fn test_update_profile() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let updated = db
            .update_profile(
                profile.id,
                &ProfileRequest {
                    name: "Renamed".to_string(),
                    height: Some(175),
                    weight: Some(dec!(70)),
                    goal: Some(FitnessGoal::Mass),
                    ..ProfileRequest::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.goal, Some(FitnessGoal::Mass));
        assert_eq!(updated.bmi().unwrap().round_dp(2), dec!(22.86));
        assert!(db.update_profile(999, &ProfileRequest::default()).is_err());
    }

    #[test]
    fn test_update_body_weight_keeps_date_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("liftlog.db");
        let mut db = Database::new(&path).unwrap();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");

        let entry = db
            .add_body_weight(
                profile.id,
                &BodyWeightRequest {
                    weight: dec!(80),
                    notes: String::new(),
                    date: Some(date(2024, 4, 1)),
                },
            )
            .unwrap();
        let request = BodyWeightRequest {
            weight: dec!(79.6),
            notes: "after cut".to_string(),
            date: None,
        };

        assert!(matches!(
            db.update_body_weight(other.id, entry.id, &request),
            Err(DatabaseError::NotFound { table: "body_weights", .. })
        ));

        let updated = db.update_body_weight(profile.id, entry.id, &request).unwrap();
        assert_eq!(updated.date, date(2024, 4, 1));
        assert_eq!(updated.created_at, entry.created_at);
        drop(db);

        let db = Database::new(&path).unwrap();
        let stored = db.get_body_weight(profile.id, entry.id).unwrap();
        assert_eq!(stored.weight, dec!(79.6));
        assert_eq!(stored.notes, "after cut");
        assert_eq!(stored.date, date(2024, 4, 1));
    }

    #[test]
    fn test_update_goal_rewrites_definition_and_keeps_progress() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");

        let mut request = GoalRequest {
            title: "Squat 150".to_string(),
            description: String::new(),
            goal_type: GoalType::Weight,
            exercise: "Squat".to_string(),
            target_value: dec!(150),
            unit: String::new(),
            target_date: Some(date(2024, 12, 31)),
        };
        let goal = db.create_goal(profile.id, &request).unwrap();
        db.update_goal_progress(profile.id, goal.id, &GoalProgressRequest { current_value: dec!(140) })
            .unwrap();

        request.title = "Squat 140".to_string();
        request.target_value = dec!(140);
        request.target_date = None;
        assert!(db.update_goal(other.id, goal.id, &request).is_err());

        let updated = db.update_goal(profile.id, goal.id, &request).unwrap();
        assert!(updated.achieved);

        let stored = db.get_goal(profile.id, goal.id).unwrap();
        assert_eq!(stored.title, "Squat 140");
        assert_eq!(stored.target_value, dec!(140));
        assert_eq!(stored.current_value, dec!(140));
        assert_eq!(stored.unit, "кг");
        assert_eq!(stored.target_date, date(2024, 12, 31));
        assert!(stored.achieved_date.is_some());
    }

    #[test]
    fn test_update_session_and_its_exercises() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");
        let session = db
            .create_session(
                profile.id,
                &TrainingSessionRequest {
                    date: Some(date(2024, 5, 1)),
                    ..TrainingSessionRequest::default()
                },
            )
            .unwrap();
        let exercise = db
            .add_session_exercise(
                profile.id,
                session.id,
                &SessionExerciseRequest {
                    exercise: "Squat".to_string(),
                    sets: vec![WorkingSet { weight: dec!(100), reps: 5, rpe: 8 }],
                    notes: String::new(),
                },
            )
            .unwrap();

        let updated = db
            .update_session(
                profile.id,
                session.id,
                &TrainingSessionRequest {
                    duration: 75,
                    notes: "heavy day".to_string(),
                    energy: 7,
                    mood: 11,
                    soreness: 3,
                    ..TrainingSessionRequest::default()
                },
            )
            .unwrap();
        assert_eq!(updated.date, date(2024, 5, 1));
        assert_eq!(updated.duration, 75);
        assert_eq!(updated.mood, 5);
        assert!(db.update_session(other.id, session.id, &TrainingSessionRequest::default()).is_err());

        let request = SessionExerciseRequest {
            exercise: " Front Squat ".to_string(),
            sets: vec![
                WorkingSet { weight: dec!(80), reps: 5, rpe: 7 },
                WorkingSet { weight: dec!(85), reps: 5, rpe: 8 },
            ],
            notes: String::new(),
        };
        assert!(matches!(
            db.update_session_exercise(other.id, session.id, exercise.id, &request),
            Err(DatabaseError::NotFound { table: "training_sessions", .. })
        ));
        assert!(matches!(
            db.update_session_exercise(profile.id, session.id, exercise.id + 100, &request),
            Err(DatabaseError::NotFound { table: "session_exercises", .. })
        ));

        let changed = db
            .update_session_exercise(profile.id, session.id, exercise.id, &request)
            .unwrap();
        assert_eq!(changed.exercise, "Front Squat");
        assert_eq!(changed.sets.len(), 2);

        let loaded = db.get_session(profile.id, session.id).unwrap();
        assert_eq!(loaded.session.notes, "heavy day");
        assert_eq!(loaded.exercises[0].sets[1].weight, dec!(85));

        assert!(db.delete_session_exercise(other.id, session.id, exercise.id).is_err());
        db.delete_session_exercise(profile.id, session.id, exercise.id).unwrap();
        assert!(db.get_session(profile.id, session.id).unwrap().exercises.is_empty());
        assert!(matches!(
            db.delete_session_exercise(profile.id, session.id, exercise.id),
            Err(DatabaseError::NotFound { table: "session_exercises", .. })
        ));
    }

    #[test]
    fn test_update_program_keeps_single_active() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");
        let first = db.create_program(profile.id, &program_request("First", true)).unwrap();
        let second = db.create_program(profile.id, &program_request("Second", false)).unwrap();

        let mut request = program_request("Second block", true);
        request.end_date = date(2024, 6, 30);
        assert!(db.update_program(other.id, second.id, &request).is_err());

        let updated = db.update_program(profile.id, second.id, &request).unwrap();
        assert_eq!(updated.name, "Second block");
        assert_eq!(updated.end_date, date(2024, 6, 30));
        assert!(updated.is_active);
        assert!(!db.get_program(profile.id, first.id).unwrap().is_active);

        let paused = db
            .update_program(profile.id, second.id, &program_request("Second block", false))
            .unwrap();
        assert!(!paused.is_active);
        assert!(!db.get_program(profile.id, first.id).unwrap().is_active);
    }

    #[test]
    fn test_update_and_delete_program_children() {
        let mut db = create_test_db();
        let profile = create_profile(&mut db, "A");
        let other = create_profile(&mut db, "B");
        let program = db.create_program(profile.id, &program_request("Block", false)).unwrap();
        let foreign = db.create_program(other.id, &program_request("Foreign", false)).unwrap();

        let mut request = ProgramExerciseRequest {
            exercise: "Bench".to_string(),
            day_of_week: 1,
            order: 1,
            sets: 3,
            reps: 8,
            weight: dec!(60),
            notes: String::new(),
        };
        let exercise = db.add_program_exercise(profile.id, program.id, &request).unwrap();

        request.day_of_week = 4;
        request.weight = dec!(62.5);
        assert!(db.update_program_exercise(other.id, program.id, exercise.id, &request).is_err());
        assert!(matches!(
            db.update_program_exercise(other.id, foreign.id, exercise.id, &request),
            Err(DatabaseError::NotFound { table: "program_exercises", .. })
        ));
        let updated = db
            .update_program_exercise(profile.id, program.id, exercise.id, &request)
            .unwrap();
        assert_eq!(updated.day_of_week, 4);
        assert_eq!(updated.weight, dec!(62.5));

        let session = db
            .log_program_session(
                profile.id,
                program.id,
                &ProgramSessionRequest {
                    date: Some(date(2024, 3, 4)),
                    completed: false,
                    notes: String::new(),
                },
            )
            .unwrap();
        let done = db
            .update_program_session(
                profile.id,
                program.id,
                session.id,
                &ProgramSessionRequest {
                    date: None,
                    completed: true,
                    notes: "all sets".to_string(),
                },
            )
            .unwrap();
        assert!(done.completed);
        assert_eq!(done.date, date(2024, 3, 4));
        assert_eq!(done.notes, "all sets");

        assert!(db.delete_program_session(other.id, program.id, session.id).is_err());
        db.delete_program_session(profile.id, program.id, session.id).unwrap();
        assert!(db.list_program_sessions(profile.id, program.id, None).unwrap().is_empty());

        db.delete_program_exercise(profile.id, program.id, exercise.id).unwrap();
        assert!(db.list_program_exercises(profile.id, program.id).unwrap().is_empty());
        assert!(matches!(
            db.delete_program_exercise(profile.id, program.id, exercise.id),
            Err(DatabaseError::NotFound { table: "program_exercises", .. })
        ));
    }
}
