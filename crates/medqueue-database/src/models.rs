//! 数据库模型
//!
//! 表结构与领域模型之间的映射。枚举按小写字符串存储，读取时无法识别的值视为存储错误。

use chrono::{DateTime, NaiveDate, Utc};
use medqueue_core::{
    Appointment, Hospital, MedQueueError, Notification, Patient, Result, Service, User,
    UserAccount,
};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

fn parse_column<T>(column: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = MedQueueError>,
{
    value
        .parse()
        .map_err(|_| MedQueueError::Storage(format!("Unexpected value in {}: {}", column, value)))
}

fn unsigned_column<S, T>(column: &str, value: S) -> Result<T>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value)
        .map_err(|_| MedQueueError::Storage(format!("Out of range value in {}: {}", column, value)))
}

/// 数据库用户表
#[derive(Debug, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub hospital_id: Option<Uuid>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for UserAccount {
    type Error = MedQueueError;

    fn try_from(row: DbUser) -> Result<Self> {
        Ok(UserAccount {
            user: User {
                id: row.id,
                email: row.email,
                name: row.name,
                role: parse_column("users.role", &row.role)?,
                phone_number: row.phone_number,
                hospital_id: row.hospital_id,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

/// 数据库医院表，服务另表存储
#[derive(Debug, FromRow)]
pub struct DbHospital {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub address: String,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl DbHospital {
    pub fn into_hospital(self, services: Vec<Service>) -> Hospital {
        Hospital {
            id: self.id,
            name: self.name,
            region: self.region,
            address: self.address,
            admin_id: self.admin_id,
            services,
            created_at: self.created_at,
        }
    }
}

/// 数据库服务表
#[derive(Debug, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub description: String,
    pub estimated_wait_time: i32,
    pub is_available: bool,
    pub position: i32,
}

impl TryFrom<DbService> for Service {
    type Error = MedQueueError;

    fn try_from(row: DbService) -> Result<Self> {
        Ok(Service {
            id: row.id,
            name: row.name,
            description: row.description,
            estimated_wait_time: unsigned_column("services.estimated_wait_time", row.estimated_wait_time)?,
            is_available: row.is_available,
        })
    }
}

/// 数据库患者表
#[derive(Debug, FromRow)]
pub struct DbPatient {
    pub id: Uuid,
    pub name: String,
    pub age: i16,
    pub gender: String,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: String,
    pub medical_history: Option<String>,
    pub current_status: String,
    pub severity: String,
    pub assigned_service: Option<Uuid>,
    pub hospital_id: Uuid,
    pub wait_time: i32,
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<DbPatient> for Patient {
    type Error = MedQueueError;

    fn try_from(row: DbPatient) -> Result<Self> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            age: unsigned_column("patients.age", row.age)?,
            gender: parse_column("patients.gender", &row.gender)?,
            phone_number: row.phone_number,
            address: row.address,
            emergency_contact: row.emergency_contact,
            medical_history: row.medical_history,
            current_status: parse_column("patients.current_status", &row.current_status)?,
            severity: parse_column("patients.severity", &row.severity)?,
            assigned_service: row.assigned_service,
            hospital_id: row.hospital_id,
            wait_time: unsigned_column("patients.wait_time", row.wait_time)?,
            doctor_notes: row.doctor_notes,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}

/// 数据库预约表
#[derive(Debug, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Option<Uuid>,
    pub doctor_name: Option<String>,
    pub service_id: Uuid,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub hospital_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = MedQueueError;

    fn try_from(row: DbAppointment) -> Result<Self> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            service_id: row.service_id,
            service_name: row.service_name,
            date: row.date,
            time: row.time,
            status: parse_column("appointments.status", &row.status)?,
            hospital_id: row.hospital_id,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}

/// 数据库通知表
#[derive(Debug, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub read: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbNotification> for Notification {
    type Error = MedQueueError;

    fn try_from(row: DbNotification) -> Result<Self> {
        Ok(Notification {
            id: row.id,
            title: row.title,
            message: row.message,
            notification_type: parse_column("notifications.notification_type", &row.notification_type)?,
            read: row.read,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

/// 批量转换查询结果
pub fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = MedQueueError>,
{
    rows.into_iter().map(T::try_from).collect()
}
