//! PostgreSQL 存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medqueue_core::{
    Appointment, AppointmentQuery, AppointmentRepository, AppointmentScope, AppointmentStatus,
    Hospital, HospitalRepository, MedQueueError, Notification, NotificationRepository, Patient,
    PatientQuery, PatientRepository, PatientUpdate, Result, Service, User, UserAccount,
    UserRepository, UserRole,
};
use uuid::Uuid;

use crate::connection::DatabasePool;
use crate::models::*;

/// 基于 PostgreSQL 的仓储实现
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: DatabasePool,
}

impl PostgresStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 医院表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS hospitals (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                region VARCHAR(255) NOT NULL,
                address TEXT NOT NULL,
                admin_id UUID NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 服务表，position 保持管理员录入顺序
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id UUID PRIMARY KEY,
                hospital_id UUID NOT NULL REFERENCES hospitals(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                estimated_wait_time INTEGER NOT NULL CHECK (estimated_wait_time >= 0),
                is_available BOOLEAN NOT NULL DEFAULT TRUE,
                position INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 用户表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email VARCHAR(255) UNIQUE NOT NULL,
                name VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL,
                phone_number VARCHAR(32),
                hospital_id UUID REFERENCES hospitals(id),
                password_hash VARCHAR(128) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 患者表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                age SMALLINT NOT NULL CHECK (age BETWEEN 0 AND 120),
                gender VARCHAR(10) NOT NULL,
                phone_number VARCHAR(32) NOT NULL,
                address TEXT NOT NULL,
                emergency_contact VARCHAR(255) NOT NULL,
                medical_history TEXT,
                current_status VARCHAR(20) NOT NULL DEFAULT 'waiting',
                severity VARCHAR(10) NOT NULL,
                assigned_service UUID,
                hospital_id UUID NOT NULL REFERENCES hospitals(id),
                wait_time INTEGER NOT NULL DEFAULT 0,
                doctor_notes TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                last_updated TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 预约表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id UUID PRIMARY KEY,
                patient_id UUID NOT NULL REFERENCES patients(id),
                patient_name VARCHAR(255) NOT NULL,
                doctor_id UUID,
                doctor_name VARCHAR(255),
                service_id UUID NOT NULL,
                service_name VARCHAR(255) NOT NULL,
                date DATE NOT NULL,
                time VARCHAR(5) NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'scheduled',
                hospital_id UUID NOT NULL REFERENCES hospitals(id),
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                last_updated TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 通知表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id UUID PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                message TEXT NOT NULL,
                notification_type VARCHAR(10) NOT NULL,
                read BOOLEAN NOT NULL DEFAULT FALSE,
                user_id UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_services_hospital_id ON services(hospital_id)",
            "CREATE INDEX IF NOT EXISTS idx_users_hospital_id ON users(hospital_id)",
            "CREATE INDEX IF NOT EXISTS idx_patients_hospital_status ON patients(hospital_id, current_status)",
            "CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_hospital_date ON appointments(hospital_id, date)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_doctor_id ON appointments(doctor_id)",
            "CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments(patient_id)",
            "CREATE INDEX IF NOT EXISTS idx_notifications_user_id ON notifications(user_id)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql).execute(pool).await?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl PatientRepository for PostgresStore {
    async fn create_patient(&self, patient: &Patient) -> Result<()> {
        insert_patient(self.pool.pool(), patient).await
    }

    async fn create_linked_patient(&self, patient: &Patient) -> Result<()> {
        let mut tx = self.pool.pool().begin().await?;

        insert_patient(&mut *tx, patient).await?;

        let linked =
            sqlx::query("UPDATE users SET hospital_id = $2 WHERE id = $1 AND role = 'patient'")
                .bind(patient.id)
                .bind(patient.hospital_id)
                .execute(&mut *tx)
                .await?;
        if linked.rows_affected() == 0 {
            // 事务在 drop 时回滚
            return Err(MedQueueError::NotFound(format!("Patient account {}", patient.id)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>> {
        let row = sqlx::query_as::<_, DbPatient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn update_patient(&self, id: Uuid, update: &PatientUpdate) -> Result<Patient> {
        let wait_time = update.wait_time.map(wait_column).transpose()?;

        // 未提供的字段保留原值
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            UPDATE patients SET
                current_status = $2,
                assigned_service = COALESCE($3, assigned_service),
                doctor_notes = COALESCE($4, doctor_notes),
                wait_time = COALESCE($5, wait_time),
                last_updated = $6
            WHERE id = $1
            RETURNING *
        "#,
        )
        .bind(id)
        .bind(update.current_status.as_str())
        .bind(update.assigned_service)
        .bind(&update.doctor_notes)
        .bind(wait_time)
        .bind(update.last_updated)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| MedQueueError::NotFound(format!("Patient {}", id)))?;

        Patient::try_from(row)
    }

    async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>> {
        let statuses: Option<Vec<String>> = query
            .statuses
            .as_ref()
            .map(|s| s.iter().map(|status| status.as_str().to_string()).collect());
        let limit = query.limit.map(|l| l as i64);

        let rows = sqlx::query_as::<_, DbPatient>(
            r#"
            SELECT * FROM patients
            WHERE hospital_id = $1
              AND ($2::TEXT[] IS NULL OR current_status = ANY($2))
            ORDER BY created_at DESC
            LIMIT $3
        "#,
        )
        .bind(query.hospital_id)
        .bind(statuses)
        .bind(limit)
        .fetch_all(self.pool.pool())
        .await?;

        convert_rows(rows)
    }
}

/// 写入一条患者记录，可在连接池或事务上执行
async fn insert_patient<'e, E>(executor: E, patient: &Patient) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO patients (id, name, age, gender, phone_number, address, emergency_contact,
            medical_history, current_status, severity, assigned_service, hospital_id,
            wait_time, doctor_notes, created_at, last_updated)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
    "#,
    )
    .bind(patient.id)
    .bind(&patient.name)
    .bind(i16::from(patient.age))
    .bind(patient.gender.as_str())
    .bind(&patient.phone_number)
    .bind(&patient.address)
    .bind(&patient.emergency_contact)
    .bind(&patient.medical_history)
    .bind(patient.current_status.as_str())
    .bind(patient.severity.as_str())
    .bind(patient.assigned_service)
    .bind(patient.hospital_id)
    .bind(wait_column(patient.wait_time)?)
    .bind(&patient.doctor_notes)
    .bind(patient.created_at)
    .bind(patient.last_updated)
    .execute(executor)
    .await?;

    Ok(())
}

fn wait_column(minutes: u32) -> Result<i32> {
    i32::try_from(minutes)
        .map_err(|_| MedQueueError::Validation(format!("Wait time too large: {}", minutes)))
}

#[async_trait]
impl HospitalRepository for PostgresStore {
    async fn create_hospital(&self, hospital: &Hospital) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hospitals (id, name, region, address, admin_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        )
        .bind(hospital.id)
        .bind(&hospital.name)
        .bind(&hospital.region)
        .bind(&hospital.address)
        .bind(hospital.admin_id)
        .bind(hospital.created_at)
        .execute(self.pool.pool())
        .await?;

        if !hospital.services.is_empty() {
            self.replace_services(hospital.id, &hospital.services).await?;
        }
        Ok(())
    }

    async fn get_hospital(&self, id: Uuid) -> Result<Option<Hospital>> {
        let row = sqlx::query_as::<_, DbHospital>("SELECT * FROM hospitals WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        match row {
            Some(row) => {
                let services = self.get_services(id).await?;
                Ok(Some(row.into_hospital(services)))
            }
            None => Ok(None),
        }
    }

    async fn get_services(&self, hospital_id: Uuid) -> Result<Vec<Service>> {
        let pool = self.pool.pool();

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM hospitals WHERE id = $1")
            .bind(hospital_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(MedQueueError::NotFound(format!("Hospital {}", hospital_id)));
        }

        let rows = sqlx::query_as::<_, DbService>(
            "SELECT * FROM services WHERE hospital_id = $1 ORDER BY position",
        )
        .bind(hospital_id)
        .fetch_all(pool)
        .await?;

        convert_rows(rows)
    }

    async fn replace_services(&self, hospital_id: Uuid, services: &[Service]) -> Result<()> {
        let mut tx = self.pool.pool().begin().await?;

        sqlx::query("DELETE FROM services WHERE hospital_id = $1")
            .bind(hospital_id)
            .execute(&mut *tx)
            .await?;

        for (position, service) in services.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO services (id, hospital_id, name, description, estimated_wait_time, is_available, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            )
            .bind(service.id)
            .bind(hospital_id)
            .bind(&service.name)
            .bind(&service.description)
            .bind(wait_column(service.estimated_wait_time)?)
            .bind(service.is_available)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn create_user(&self, account: &UserAccount) -> Result<()> {
        let user = &account.user;
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, phone_number, hospital_id, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.phone_number)
        .bind(user.hospital_id)
        .bind(&account.password_hash)
        .bind(user.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(row.map(UserAccount::try_from).transpose()?.map(|a| a.user))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool.pool())
            .await?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn list_users(&self, hospital_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT * FROM users
            WHERE hospital_id = $1 AND ($2::TEXT IS NULL OR role = $2)
            ORDER BY created_at
        "#,
        )
        .bind(hospital_id)
        .bind(role.map(|r| r.as_str()))
        .fetch_all(self.pool.pool())
        .await?;

        let accounts: Vec<UserAccount> = convert_rows(rows)?;
        Ok(accounts.into_iter().map(|a| a.user).collect())
    }

    async fn set_user_hospital(&self, user_id: Uuid, hospital_id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, DbUser>(
            "UPDATE users SET hospital_id = $2 WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(hospital_id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| MedQueueError::NotFound(format!("User {}", user_id)))?;

        Ok(UserAccount::try_from(row)?.user)
    }
}

#[async_trait]
impl AppointmentRepository for PostgresStore {
    async fn create_appointment(&self, appointment: &Appointment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (id, patient_id, patient_name, doctor_id, doctor_name,
                service_id, service_name, date, time, status, hospital_id, created_at, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
        )
        .bind(appointment.id)
        .bind(appointment.patient_id)
        .bind(&appointment.patient_name)
        .bind(appointment.doctor_id)
        .bind(&appointment.doctor_name)
        .bind(appointment.service_id)
        .bind(&appointment.service_name)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.status.as_str())
        .bind(appointment.hospital_id)
        .bind(appointment.created_at)
        .bind(appointment.last_updated)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, DbAppointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.map(Appointment::try_from).transpose()
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        last_updated: DateTime<Utc>,
    ) -> Result<Appointment> {
        let row = sqlx::query_as::<_, DbAppointment>(
            "UPDATE appointments SET status = $2, last_updated = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(last_updated)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| MedQueueError::NotFound(format!("Appointment {}", id)))?;

        Appointment::try_from(row)
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>> {
        let scope_column = match query.scope {
            AppointmentScope::Hospital(_) => "hospital_id",
            AppointmentScope::Doctor(_) => "doctor_id",
            AppointmentScope::Patient(_) => "patient_id",
        };
        let scope_id = match query.scope {
            AppointmentScope::Hospital(id)
            | AppointmentScope::Doctor(id)
            | AppointmentScope::Patient(id) => id,
        };

        let sql = format!(
            r#"
            SELECT * FROM appointments
            WHERE {} = $1
              AND ($2::UUID IS NULL OR hospital_id = $2)
              AND ($3::DATE IS NULL OR date >= $3)
            ORDER BY date DESC, time DESC
        "#,
            scope_column
        );

        let rows = sqlx::query_as::<_, DbAppointment>(&sql)
            .bind(scope_id)
            .bind(query.hospital_id)
            .bind(query.from_date)
            .fetch_all(self.pool.pool())
            .await?;

        convert_rows(rows)
    }
}

#[async_trait]
impl NotificationRepository for PostgresStore {
    async fn create_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, title, message, notification_type, read, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
        )
        .bind(notification.id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.read)
        .bind(notification.user_id)
        .bind(notification.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, DbNotification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        convert_rows(rows)
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(MedQueueError::NotFound(format!("Notification {}", id)));
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(self.pool.pool())
                .await?;

        Ok(result.rows_affected())
    }
}
