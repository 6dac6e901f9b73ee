//! 仓储接口
//!
//! 存储层以注入依赖的形式提供给工作流引擎。查询参数是显式的类型化结构，
//! 过滤与排序语义由各实现保证：患者按登记时间倒序，预约按日期倒序，通知按创建时间倒序。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Appointment, AppointmentStatus, Hospital, Notification, Patient, PatientStatus, Service, User,
    UserRole,
};

/// 患者列表查询参数
#[derive(Debug, Clone, PartialEq)]
pub struct PatientQuery {
    pub hospital_id: Uuid,
    /// 为 `None` 时返回全部状态
    pub statuses: Option<Vec<PatientStatus>>,
    pub limit: Option<usize>,
}

impl PatientQuery {
    pub fn for_hospital(hospital_id: Uuid) -> Self {
        Self {
            hospital_id,
            statuses: None,
            limit: None,
        }
    }

    pub fn with_statuses(mut self, statuses: &[PatientStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 判断记录是否满足查询条件（不含数量限制）
    pub fn matches(&self, patient: &Patient) -> bool {
        patient.hospital_id == self.hospital_id
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&patient.current_status))
    }
}

/// 患者更新内容，`None` 字段保持原值
#[derive(Debug, Clone, PartialEq)]
pub struct PatientUpdate {
    pub current_status: PatientStatus,
    pub assigned_service: Option<Uuid>,
    pub doctor_notes: Option<String>,
    pub wait_time: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

impl PatientUpdate {
    /// 把更新应用到内存中的记录上
    pub fn apply(&self, patient: &mut Patient) {
        patient.current_status = self.current_status;
        if let Some(service_id) = self.assigned_service {
            patient.assigned_service = Some(service_id);
        }
        if let Some(notes) = &self.doctor_notes {
            patient.doctor_notes = Some(notes.clone());
        }
        if let Some(wait_time) = self.wait_time {
            patient.wait_time = wait_time;
        }
        patient.last_updated = self.last_updated;
    }
}

/// 预约查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    Hospital(Uuid),
    Doctor(Uuid),
    Patient(Uuid),
}

/// 预约列表查询参数
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentQuery {
    pub scope: AppointmentScope,
    pub hospital_id: Option<Uuid>,
    /// 仅返回不早于该日期的预约
    pub from_date: Option<NaiveDate>,
}

impl AppointmentQuery {
    pub fn new(scope: AppointmentScope) -> Self {
        Self {
            scope,
            hospital_id: None,
            from_date: None,
        }
    }

    pub fn in_hospital(mut self, hospital_id: Uuid) -> Self {
        self.hospital_id = Some(hospital_id);
        self
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        let in_scope = match self.scope {
            AppointmentScope::Hospital(id) => appointment.hospital_id == id,
            AppointmentScope::Doctor(id) => appointment.doctor_id == Some(id),
            AppointmentScope::Patient(id) => appointment.patient_id == id,
        };
        in_scope
            && self.hospital_id.map_or(true, |id| appointment.hospital_id == id)
            && self.from_date.map_or(true, |date| appointment.date >= date)
    }
}

/// 带凭据的账号记录
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub user: User,
    /// `salt$hex(sha256)` 格式
    pub password_hash: String,
}

/// 患者仓储
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// 新建患者记录，id 冲突时返回校验错误
    async fn create_patient(&self, patient: &Patient) -> Result<()>;

    /// 新建患者记录并把同 id 的患者账号关联到记录所在医院，两步写入要么都成功要么都不生效。
    /// 账号不存在时返回 `NotFound`
    async fn create_linked_patient(&self, patient: &Patient) -> Result<()>;

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>>;

    /// 更新患者，记录不存在时返回 `NotFound`
    async fn update_patient(&self, id: Uuid, update: &PatientUpdate) -> Result<Patient>;

    async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>>;
}

/// 医院与服务仓储
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn create_hospital(&self, hospital: &Hospital) -> Result<()>;

    async fn get_hospital(&self, id: Uuid) -> Result<Option<Hospital>>;

    /// 医院不存在时返回 `NotFound`
    async fn get_services(&self, hospital_id: Uuid) -> Result<Vec<Service>>;

    async fn replace_services(&self, hospital_id: Uuid, services: &[Service]) -> Result<()>;
}

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 邮箱重复时返回校验错误
    async fn create_user(&self, account: &UserAccount) -> Result<()>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

    async fn list_users(&self, hospital_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>>;

    async fn set_user_hospital(&self, user_id: Uuid, hospital_id: Uuid) -> Result<User>;
}

/// 预约仓储
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create_appointment(&self, appointment: &Appointment) -> Result<()>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>>;

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        last_updated: DateTime<Utc>,
    ) -> Result<Appointment>;

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>>;
}

/// 通知仓储
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, notification: &Notification) -> Result<()>;

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    /// 只能标记属于该用户的通知
    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<()>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64>;
}

/// 工作流引擎所需的全部存储能力
pub trait FlowStore:
    PatientRepository + HospitalRepository + UserRepository + AppointmentRepository + NotificationRepository
{
}

impl<T> FlowStore for T where
    T: PatientRepository
        + HospitalRepository
        + UserRepository
        + AppointmentRepository
        + NotificationRepository
{
}
