//! 访问控制
//!
//! 以 (角色, 操作) 为键的能力表，每个操作只查询一次。

use medqueue_core::{MedQueueError, Result, User, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// 受控操作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewPatientQueue,
    RegisterPatient,
    /// 修改状态、分配服务、填写医嘱
    UpdatePatientQueue,
    ViewOwnRecord,
    ListAppointments,
    ScheduleAppointment,
    UpdateAppointment,
    ManageServices,
    ManageStaff,
    ViewAnalytics,
    RegisterHospital,
    ViewDashboard,
    ViewNotifications,
    SendNotification,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 能力表
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    grants: HashSet<(UserRole, Action)>,
}

impl AccessPolicy {
    /// 创建默认能力表
    pub fn new() -> Self {
        use Action::*;
        use UserRole::*;

        let table: &[(Action, &[UserRole])] = &[
            (ViewPatientQueue, &[Admin, Receptionist, Doctor, Nurse]),
            (RegisterPatient, &[Admin, Receptionist]),
            (UpdatePatientQueue, &[Admin, Receptionist, Doctor, Nurse]),
            (ViewOwnRecord, &[Patient]),
            (ListAppointments, &[Admin, Receptionist, Doctor, Nurse, Patient]),
            (ScheduleAppointment, &[Admin, Receptionist, Patient]),
            // 医生只能修改分配给自己的预约，由调用方进一步校验
            (UpdateAppointment, &[Admin, Receptionist, Doctor]),
            (ManageServices, &[Admin]),
            (ManageStaff, &[Admin]),
            (ViewAnalytics, &[Admin]),
            (RegisterHospital, &[Admin]),
            (ViewDashboard, &[Admin, Receptionist, Doctor, Nurse, Patient]),
            (ViewNotifications, &[Admin, Receptionist, Doctor, Nurse, Patient]),
            (SendNotification, &[Admin]),
        ];

        let grants = table
            .iter()
            .flat_map(|(action, roles)| roles.iter().map(move |role| (*role, *action)))
            .collect();

        Self { grants }
    }

    pub fn is_allowed(&self, role: UserRole, action: Action) -> bool {
        self.grants.contains(&(role, action))
    }

    /// 校验用户是否具备操作权限
    pub fn authorize(&self, user: &User, action: Action) -> Result<()> {
        if self.is_allowed(user.role, action) {
            return Ok(());
        }

        tracing::warn!("Access denied: user {} ({}) attempted {}", user.id, user.role, action);
        Err(MedQueueError::Permission(format!(
            "Role {} is not permitted to perform {}",
            user.role, action
        )))
    }

    /// 获取可执行某操作的角色
    pub fn roles_for(&self, action: Action) -> Vec<UserRole> {
        UserRole::ALL
            .iter()
            .copied()
            .filter(|role| self.is_allowed(*role, action))
            .collect()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// 用户所属医院，未关联医院时返回校验错误
pub fn require_hospital(user: &User) -> Result<Uuid> {
    user.hospital_id.ok_or_else(|| {
        MedQueueError::Validation("You must be associated with a hospital".to_string())
    })
}

/// 校验记录与用户属于同一医院
pub fn ensure_same_hospital(user: &User, hospital_id: Uuid) -> Result<()> {
    if user.hospital_id == Some(hospital_id) {
        return Ok(());
    }

    tracing::warn!(
        "Cross-hospital access blocked: user {} targeted hospital {}",
        user.id,
        hospital_id
    );
    Err(MedQueueError::Permission(
        "Record belongs to a different hospital".to_string(),
    ))
}
