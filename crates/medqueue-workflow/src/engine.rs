//! 工作流引擎
//!
//! 协调分诊预估、排队状态机与访问控制的服务层。每个操作先做权限校验，
//! 再做输入校验，最后才写入存储；校验失败时不会产生部分写入。

use chrono::{DateTime, NaiveDate, Utc};
use medqueue_core::{
    utils, validation, Appointment, AppointmentQuery, AppointmentScope, AppointmentStatus,
    FlowStore, Hospital, MedQueueError, Notification, NotificationRequest, Patient, PatientQuery,
    PatientStatus, PatientUpdate, QueueUpdateRequest, RegisterHospitalRequest,
    RegisterPatientRequest, Result, ScheduleAppointmentRequest, Service, ServiceRequest, Severity,
    SignUpRequest, StaffRequest, User, UserAccount, UserRole,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    access::{ensure_same_hospital, require_hospital, AccessPolicy, Action},
    analytics::HospitalAnalytics,
    appointments::{AppointmentFilter, DateWindow},
    observer::{FlowObserver, NoopObserver},
    queue::{PatientFilter, QueueStats},
    state_machine::{PatientStateMachine, TransitionPolicy},
    triage::{TriageEstimator, WaitEstimate},
};

/// 工作台展示的当日预约数量
const DASHBOARD_APPOINTMENTS: usize = 5;

/// 引擎行为开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// 禁止离开终态
    pub strict_transitions: bool,
    /// 分配新服务时重新计算候诊时间
    pub recompute_wait_on_reassign: bool,
    /// 工作台显示的最近登记患者数量
    pub recent_patients_limit: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            strict_transitions: false,
            recompute_wait_on_reassign: false,
            recent_patients_limit: 5,
        }
    }
}

/// 角色工作台
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub role: UserRole,
    pub hospital: Option<Hospital>,
    pub stats: QueueStats,
    pub patients: Vec<Patient>,
    pub appointments: Vec<Appointment>,
}

/// 通知收件箱
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInbox {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

/// 工作流引擎
pub struct WorkflowEngine {
    store: Arc<dyn FlowStore>,
    state_machine: PatientStateMachine,
    access: AccessPolicy,
    settings: WorkflowSettings,
    observer: Arc<dyn FlowObserver>,
}

impl WorkflowEngine {
    /// 使用默认设置创建引擎
    pub fn new(store: Arc<dyn FlowStore>) -> Self {
        Self::with_settings(store, WorkflowSettings::default())
    }

    pub fn with_settings(store: Arc<dyn FlowStore>, settings: WorkflowSettings) -> Self {
        let policy = if settings.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        };

        Self {
            store,
            state_machine: PatientStateMachine::with_policy(policy),
            access: AccessPolicy::new(),
            settings,
            observer: Arc::new(NoopObserver),
        }
    }

    /// 替换事件观察者
    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn state_machine(&self) -> &PatientStateMachine {
        &self.state_machine
    }

    fn authorize(&self, caller: &User, action: Action) -> Result<()> {
        self.access.authorize(caller, action).map_err(|err| {
            self.observer.access_denied(caller.role, action);
            err
        })
    }

    // ---- 账号 ----

    /// 注册账号，新账号尚未关联医院
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User> {
        let email = validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;
        let name = validation::require_text("Name", &request.name)?;
        let phone_number = match validation::optional_text(request.phone_number.as_deref()) {
            Some(phone) => Some(validation::validate_phone(&phone)?),
            None => None,
        };

        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            role: request.role,
            phone_number,
            hospital_id: None,
            created_at: Utc::now(),
        };
        self.create_account(&user, &request.password).await?;

        tracing::info!("Registered {} account {}", user.role, user.id);
        Ok(user)
    }

    /// 邮箱密码登录
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || MedQueueError::Unauthenticated("Invalid email or password".to_string());

        let email = email.trim().to_lowercase();
        let account = self
            .store
            .find_account_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !utils::verify_password(password, &account.password_hash) {
            tracing::warn!("Failed login for account {}", account.user.id);
            return Err(invalid());
        }

        Ok(account.user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| MedQueueError::NotFound(format!("User {}", id)))
    }

    async fn create_account(&self, user: &User, password: &str) -> Result<()> {
        let salt = utils::generate_salt();
        let account = UserAccount {
            user: user.clone(),
            password_hash: utils::hash_password(password, &salt),
        };
        self.store.create_user(&account).await
    }

    // ---- 医院与服务 ----

    /// 注册医院并将管理员关联到该医院
    pub async fn register_hospital(
        &self,
        caller: &User,
        request: RegisterHospitalRequest,
    ) -> Result<Hospital> {
        self.authorize(caller, Action::RegisterHospital)?;
        if caller.hospital_id.is_some() {
            return Err(MedQueueError::Validation(
                "You are already associated with a hospital".to_string(),
            ));
        }

        let hospital = Hospital {
            id: Uuid::new_v4(),
            name: validation::require_text("Hospital name", &request.name)?,
            region: validation::require_text("Region", &request.region)?,
            address: validation::require_text("Address", &request.address)?,
            admin_id: caller.id,
            services: Vec::new(),
            created_at: Utc::now(),
        };

        self.store.create_hospital(&hospital).await?;
        self.store.set_user_hospital(caller.id, hospital.id).await?;

        tracing::info!("Hospital {} registered by admin {}", hospital.id, caller.id);
        Ok(hospital)
    }

    pub async fn get_hospital(&self, caller: &User) -> Result<Hospital> {
        let hospital_id = require_hospital(caller)?;
        self.store
            .get_hospital(hospital_id)
            .await?
            .ok_or_else(|| MedQueueError::NotFound(format!("Hospital {}", hospital_id)))
    }

    pub async fn list_services(&self, caller: &User) -> Result<Vec<Service>> {
        let hospital_id = require_hospital(caller)?;
        self.store.get_services(hospital_id).await
    }

    /// 当前可选的服务
    pub async fn available_services(&self, caller: &User) -> Result<Vec<Service>> {
        let services = self.list_services(caller).await?;
        Ok(services.into_iter().filter(|s| s.is_available).collect())
    }

    pub async fn add_service(&self, caller: &User, request: ServiceRequest) -> Result<Service> {
        self.authorize(caller, Action::ManageServices)?;
        let hospital_id = require_hospital(caller)?;

        let service = Service {
            id: Uuid::new_v4(),
            name: validation::require_text("Service name", &request.name)?,
            description: request.description.trim().to_string(),
            estimated_wait_time: validation::validate_wait_time(request.estimated_wait_time)?,
            is_available: request.is_available,
        };

        let mut services = self.store.get_services(hospital_id).await?;
        services.push(service.clone());
        self.store.replace_services(hospital_id, &services).await?;

        tracing::info!("Service {} added to hospital {}", service.id, hospital_id);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        caller: &User,
        service_id: Uuid,
        request: ServiceRequest,
    ) -> Result<Service> {
        self.authorize(caller, Action::ManageServices)?;
        let hospital_id = require_hospital(caller)?;

        let name = validation::require_text("Service name", &request.name)?;
        let estimated_wait_time = validation::validate_wait_time(request.estimated_wait_time)?;

        let mut services = self.store.get_services(hospital_id).await?;
        let service = services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| MedQueueError::NotFound(format!("Service {}", service_id)))?;

        service.name = name;
        service.description = request.description.trim().to_string();
        service.estimated_wait_time = estimated_wait_time;
        service.is_available = request.is_available;
        let updated = service.clone();

        self.store.replace_services(hospital_id, &services).await?;
        Ok(updated)
    }

    pub async fn remove_service(&self, caller: &User, service_id: Uuid) -> Result<()> {
        self.authorize(caller, Action::ManageServices)?;
        let hospital_id = require_hospital(caller)?;

        let mut services = self.store.get_services(hospital_id).await?;
        let before = services.len();
        services.retain(|s| s.id != service_id);
        if services.len() == before {
            return Err(MedQueueError::NotFound(format!("Service {}", service_id)));
        }

        self.store.replace_services(hospital_id, &services).await?;
        tracing::info!("Service {} removed from hospital {}", service_id, hospital_id);
        Ok(())
    }

    /// 在医院的可用服务中解析服务，未知或不可用均视为不存在
    async fn resolve_available_service(&self, hospital_id: Uuid, service_id: Uuid) -> Result<Service> {
        self.store
            .get_services(hospital_id)
            .await?
            .into_iter()
            .find(|s| s.id == service_id && s.is_available)
            .ok_or_else(|| {
                MedQueueError::NotFound(format!("Service {} is not available", service_id))
            })
    }

    // ---- 员工 ----

    pub async fn add_staff(&self, caller: &User, request: StaffRequest) -> Result<User> {
        self.authorize(caller, Action::ManageStaff)?;
        let hospital_id = require_hospital(caller)?;

        if !request.role.is_staff() {
            return Err(MedQueueError::Validation(format!(
                "Role {} is not a staff role",
                request.role
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: validation::validate_email(&request.email)?,
            name: validation::require_text("Name", &request.name)?,
            role: request.role,
            phone_number: Some(validation::validate_phone(&request.phone_number)?),
            hospital_id: Some(hospital_id),
            created_at: Utc::now(),
        };
        validation::validate_password(&request.password)?;
        self.create_account(&user, &request.password).await?;

        tracing::info!("Staff {} ({}) added to hospital {}", user.id, user.role, hospital_id);
        Ok(user)
    }

    pub async fn list_staff(&self, caller: &User) -> Result<Vec<User>> {
        self.authorize(caller, Action::ManageStaff)?;
        let hospital_id = require_hospital(caller)?;

        let users = self.store.list_users(hospital_id, None).await?;
        Ok(users.into_iter().filter(|u| u.role.is_staff()).collect())
    }

    // ---- 患者排队 ----

    /// 登记患者，候诊时间在此一次性计算
    pub async fn register_patient(
        &self,
        caller: &User,
        request: RegisterPatientRequest,
    ) -> Result<Patient> {
        self.authorize(caller, Action::RegisterPatient)?;
        let hospital_id = require_hospital(caller)?;

        let name = validation::require_text("Name", &request.name)?;
        let age = validation::validate_age(request.age)?;
        let phone_number = validation::validate_phone(&request.phone_number)?;
        let address = validation::require_text("Address", &request.address)?;
        let emergency_contact = validation::require_text("Emergency contact", &request.emergency_contact)?;

        let service = match request.assigned_service {
            Some(service_id) => Some(self.resolve_available_service(hospital_id, service_id).await?),
            None => None,
        };
        let services: Vec<Service> = service.iter().cloned().collect();
        let wait_time =
            TriageEstimator::estimate(request.severity, service.as_ref().map(|s| s.id), &services);

        let id = match request.patient_account_id {
            Some(account_id) => {
                let account = self.get_user(account_id).await?;
                if account.role != UserRole::Patient {
                    return Err(MedQueueError::Validation(format!(
                        "User {} is not a patient account",
                        account_id
                    )));
                }
                if let Some(other) = account.hospital_id.filter(|h| *h != hospital_id) {
                    tracing::warn!("Patient account {} already belongs to hospital {}", account_id, other);
                    return Err(MedQueueError::Permission(
                        "Patient account belongs to a different hospital".to_string(),
                    ));
                }
                account_id
            }
            None => Uuid::new_v4(),
        };

        let now = Utc::now();
        let patient = Patient {
            id,
            name,
            age,
            gender: request.gender,
            phone_number,
            address,
            emergency_contact,
            medical_history: validation::optional_text(request.medical_history.as_deref()),
            current_status: PatientStateMachine::initial_state(),
            severity: request.severity,
            assigned_service: service.map(|s| s.id),
            hospital_id,
            wait_time,
            doctor_notes: None,
            created_at: now,
            last_updated: now,
        };

        if request.patient_account_id.is_some() {
            self.store.create_linked_patient(&patient).await?;
        } else {
            self.store.create_patient(&patient).await?;
        }

        self.observer.patient_registered(patient.severity, patient.wait_time);
        tracing::info!(
            "Registered patient {} ({}) with estimated wait {} minutes",
            patient.id,
            patient.severity,
            patient.wait_time
        );
        Ok(patient)
    }

    /// 员工查看本院患者，患者只能查看自己的记录
    pub async fn get_patient(&self, caller: &User, id: Uuid) -> Result<Patient> {
        if caller.role == UserRole::Patient {
            self.authorize(caller, Action::ViewOwnRecord)?;
            if caller.id != id {
                return Err(MedQueueError::Permission(
                    "Patients may only view their own record".to_string(),
                ));
            }
        } else {
            self.authorize(caller, Action::ViewPatientQueue)?;
        }

        let patient = self.fetch_patient(id).await?;
        if caller.role.is_staff() {
            ensure_same_hospital(caller, patient.hospital_id)?;
        }
        Ok(patient)
    }

    async fn fetch_patient(&self, id: Uuid) -> Result<Patient> {
        self.store
            .get_patient(id)
            .await?
            .ok_or_else(|| MedQueueError::NotFound(format!("Patient {}", id)))
    }

    /// 更新排队状态，最后写入者生效
    pub async fn update_patient_queue(
        &self,
        caller: &User,
        id: Uuid,
        request: QueueUpdateRequest,
    ) -> Result<Patient> {
        self.authorize(caller, Action::UpdatePatientQueue)?;
        let patient = self.fetch_patient(id).await?;
        ensure_same_hospital(caller, patient.hospital_id)?;

        let from = patient.current_status;
        let to = self.state_machine.transition(from, request.current_status)?;

        let service = match request.assigned_service {
            Some(service_id) => {
                Some(self.resolve_available_service(patient.hospital_id, service_id).await?)
            }
            None => None,
        };

        let wait_time = match &service {
            Some(s) if self.settings.recompute_wait_on_reassign => Some(TriageEstimator::estimate(
                patient.severity,
                Some(s.id),
                std::slice::from_ref(s),
            )),
            _ => None,
        };

        let update = PatientUpdate {
            current_status: to,
            assigned_service: service.map(|s| s.id),
            doctor_notes: validation::optional_text(request.doctor_notes.as_deref()),
            wait_time,
            last_updated: Utc::now(),
        };
        let updated = self.store.update_patient(id, &update).await?;

        self.observer.status_changed(from, to);
        tracing::info!("Patient {} status {} -> {} by {} {}", id, from, to, caller.role, caller.id);
        Ok(updated)
    }

    /// 角色范围内的患者列表，医生与护士只看到候诊与就诊中的患者
    pub async fn list_patients(&self, caller: &User, filter: &PatientFilter) -> Result<Vec<Patient>> {
        self.authorize(caller, Action::ViewPatientQueue)?;
        let hospital_id = require_hospital(caller)?;

        let patients = self.store.list_patients(&self.patient_scope(caller, hospital_id)).await?;
        Ok(filter.apply(patients))
    }

    fn patient_scope(&self, caller: &User, hospital_id: Uuid) -> PatientQuery {
        let query = PatientQuery::for_hospital(hospital_id);
        match caller.role {
            UserRole::Doctor | UserRole::Nurse => query.with_statuses(PatientStatus::ACTIVE),
            _ => query,
        }
    }

    /// 候诊时间预览，不写入任何记录；无法识别的严重程度按 30 分钟计
    pub async fn estimate_wait(
        &self,
        caller: &User,
        severity_label: &str,
        service_id: Option<Uuid>,
    ) -> Result<WaitEstimate> {
        self.authorize(caller, Action::ViewPatientQueue)?;
        let services = self.available_services(caller).await?;
        Ok(TriageEstimator::breakdown(
            TriageEstimator::base_wait_for_label(severity_label),
            service_id,
            &services,
        ))
    }

    // ---- 预约 ----

    pub async fn schedule_appointment(
        &self,
        caller: &User,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment> {
        self.authorize(caller, Action::ScheduleAppointment)?;
        let hospital_id = require_hospital(caller)?;

        let patient_id = if caller.role == UserRole::Patient {
            caller.id
        } else {
            request
                .patient_id
                .ok_or_else(|| MedQueueError::Validation("Patient is required".to_string()))?
        };
        let service_id = request
            .service_id
            .ok_or_else(|| MedQueueError::Validation("Service is required".to_string()))?;
        let date = request
            .date
            .ok_or_else(|| MedQueueError::Validation("Date is required".to_string()))?;
        let time = validation::parse_time_of_day(request.time.as_deref().unwrap_or_default())?;

        let patient = self.fetch_patient(patient_id).await?;
        ensure_same_hospital(caller, patient.hospital_id)?;
        let service = self.resolve_available_service(hospital_id, service_id).await?;

        let doctor = match request.doctor_id {
            Some(doctor_id) => {
                let doctor = self.get_user(doctor_id).await?;
                if doctor.role != UserRole::Doctor {
                    return Err(MedQueueError::Validation(format!(
                        "User {} is not a doctor",
                        doctor_id
                    )));
                }
                if doctor.hospital_id != Some(hospital_id) {
                    return Err(MedQueueError::Permission(
                        "Doctor belongs to a different hospital".to_string(),
                    ));
                }
                Some(doctor)
            }
            None => None,
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            patient_name: patient.name,
            doctor_id: doctor.as_ref().map(|d| d.id),
            doctor_name: doctor.map(|d| d.name),
            service_id: service.id,
            service_name: service.name,
            date,
            time,
            status: AppointmentStatus::Scheduled,
            hospital_id,
            created_at: now,
            last_updated: now,
        };

        self.store.create_appointment(&appointment).await?;
        tracing::info!(
            "Appointment {} scheduled for patient {} on {} {}",
            appointment.id,
            appointment.patient_id,
            appointment.date,
            appointment.time
        );
        Ok(appointment)
    }

    pub async fn get_appointment(&self, caller: &User, id: Uuid) -> Result<Appointment> {
        self.authorize(caller, Action::ListAppointments)?;
        let appointment = self.fetch_appointment(id).await?;

        if caller.role == UserRole::Patient {
            if appointment.patient_id != caller.id {
                return Err(MedQueueError::Permission(
                    "Patients may only view their own appointments".to_string(),
                ));
            }
        } else {
            ensure_same_hospital(caller, appointment.hospital_id)?;
        }
        Ok(appointment)
    }

    async fn fetch_appointment(&self, id: Uuid) -> Result<Appointment> {
        self.store
            .get_appointment(id)
            .await?
            .ok_or_else(|| MedQueueError::NotFound(format!("Appointment {}", id)))
    }

    /// 医生只能修改分配给自己的预约
    pub async fn update_appointment_status(
        &self,
        caller: &User,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        self.authorize(caller, Action::UpdateAppointment)?;
        let appointment = self.fetch_appointment(id).await?;
        ensure_same_hospital(caller, appointment.hospital_id)?;

        if caller.role == UserRole::Doctor && appointment.doctor_id != Some(caller.id) {
            self.observer.access_denied(caller.role, Action::UpdateAppointment);
            return Err(MedQueueError::Permission(
                "Doctors may only update their own appointments".to_string(),
            ));
        }

        let updated = self
            .store
            .update_appointment_status(id, status, Utc::now())
            .await?;
        tracing::info!("Appointment {} marked {}", id, status);
        Ok(updated)
    }

    pub async fn list_appointments(
        &self,
        caller: &User,
        filter: &AppointmentFilter,
        today: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        self.authorize(caller, Action::ListAppointments)?;
        let hospital_id = require_hospital(caller)?;

        let appointments = self
            .store
            .list_appointments(&Self::appointment_scope(caller, hospital_id))
            .await?;
        Ok(filter.apply(appointments, today))
    }

    fn appointment_scope(caller: &User, hospital_id: Uuid) -> AppointmentQuery {
        let scope = match caller.role {
            UserRole::Admin | UserRole::Receptionist => AppointmentScope::Hospital(hospital_id),
            UserRole::Doctor | UserRole::Nurse => AppointmentScope::Doctor(caller.id),
            UserRole::Patient => AppointmentScope::Patient(caller.id),
        };
        AppointmentQuery::new(scope).in_hospital(hospital_id)
    }

    // ---- 工作台与统计 ----

    /// 按角色汇总工作台，未关联医院时返回空工作台
    pub async fn dashboard(&self, caller: &User, today: NaiveDate) -> Result<Dashboard> {
        self.authorize(caller, Action::ViewDashboard)?;

        let mut dashboard = Dashboard {
            role: caller.role,
            hospital: None,
            stats: QueueStats::default(),
            patients: Vec::new(),
            appointments: Vec::new(),
        };

        let Some(hospital_id) = caller.hospital_id else {
            return Ok(dashboard);
        };
        dashboard.hospital = self.store.get_hospital(hospital_id).await?;

        match caller.role {
            UserRole::Admin | UserRole::Receptionist | UserRole::Doctor | UserRole::Nurse => {
                let provider_view = matches!(caller.role, UserRole::Doctor | UserRole::Nurse);
                let patients = self.store.list_patients(&self.patient_scope(caller, hospital_id)).await?;
                dashboard.stats = QueueStats::from_patients(&patients, today, !provider_view);

                let mut query = Self::appointment_scope(caller, hospital_id);
                if provider_view {
                    query = query.from_date(today);
                }
                let appointments = self.store.list_appointments(&query).await?;
                dashboard.stats.appointments_today =
                    appointments.iter().filter(|a| a.date == today).count();

                dashboard.appointments = if provider_view {
                    appointments
                } else {
                    appointments
                        .into_iter()
                        .filter(|a| DateWindow::Today.contains(a.date, today))
                        .take(DASHBOARD_APPOINTMENTS)
                        .collect()
                };
                dashboard.patients = patients
                    .into_iter()
                    .take(self.settings.recent_patients_limit)
                    .collect();
            }
            UserRole::Patient => {
                if let Some(record) = self.store.get_patient(caller.id).await? {
                    dashboard.patients.push(record);
                }
                let mut appointments = self
                    .store
                    .list_appointments(&Self::appointment_scope(caller, hospital_id))
                    .await?;
                // 患者工作台按日期由近到远
                appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
                dashboard.appointments = appointments;
                dashboard.stats.total_patients = dashboard.patients.len();
                dashboard.stats.appointments_today =
                    dashboard.appointments.iter().filter(|a| a.date == today).count();
            }
        }

        Ok(dashboard)
    }

    pub async fn analytics(&self, caller: &User, now: DateTime<Utc>) -> Result<HospitalAnalytics> {
        self.authorize(caller, Action::ViewAnalytics)?;
        let hospital_id = require_hospital(caller)?;

        let patients = self.store.list_patients(&PatientQuery::for_hospital(hospital_id)).await?;
        Ok(HospitalAnalytics::compute(&patients, now))
    }

    // ---- 通知 ----

    pub async fn list_notifications(&self, caller: &User) -> Result<NotificationInbox> {
        self.authorize(caller, Action::ViewNotifications)?;
        let notifications = self.store.list_notifications(caller.id).await?;
        let unread_count = notifications.iter().filter(|n| !n.read).count();
        Ok(NotificationInbox {
            notifications,
            unread_count,
        })
    }

    pub async fn mark_notification_read(&self, caller: &User, id: Uuid) -> Result<()> {
        self.authorize(caller, Action::ViewNotifications)?;
        self.store.mark_notification_read(caller.id, id).await
    }

    pub async fn mark_all_read(&self, caller: &User) -> Result<u64> {
        self.authorize(caller, Action::ViewNotifications)?;
        self.store.mark_all_notifications_read(caller.id).await
    }

    /// 向本院用户发送通知
    pub async fn send_notification(
        &self,
        caller: &User,
        request: NotificationRequest,
    ) -> Result<Notification> {
        self.authorize(caller, Action::SendNotification)?;
        let hospital_id = require_hospital(caller)?;

        let recipient = self.get_user(request.user_id).await?;
        if recipient.hospital_id != Some(hospital_id) {
            return Err(MedQueueError::Permission(
                "Recipient belongs to a different hospital".to_string(),
            ));
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            title: validation::require_text("Title", &request.title)?,
            message: validation::require_text("Message", &request.message)?,
            notification_type: request.notification_type,
            read: false,
            user_id: recipient.id,
            created_at: Utc::now(),
        };

        self.store.create_notification(&notification).await?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medqueue_core::{Gender, NotificationType};
    use medqueue_database::InMemoryStore;
    use std::sync::Mutex;

    struct Fixture {
        engine: WorkflowEngine,
        admin: User,
    }

    impl Fixture {
        async fn new() -> Self {
            Self::with_settings(WorkflowSettings::default()).await
        }

        async fn with_settings(settings: WorkflowSettings) -> Self {
            let engine = WorkflowEngine::with_settings(Arc::new(InMemoryStore::new()), settings);
            let admin = engine
                .sign_up(sign_up("admin@stluke.org", UserRole::Admin))
                .await
                .unwrap();
            engine
                .register_hospital(
                    &admin,
                    RegisterHospitalRequest {
                        name: "St. Luke".to_string(),
                        region: "Lagos".to_string(),
                        address: "1 Marina".to_string(),
                    },
                )
                .await
                .unwrap();
            let admin = engine.get_user(admin.id).await.unwrap();
            Self { engine, admin }
        }

        async fn staff(&self, email: &str, role: UserRole) -> User {
            self.engine
                .add_staff(
                    &self.admin,
                    StaffRequest {
                        name: format!("{} user", role),
                        email: email.to_string(),
                        role,
                        phone_number: "0800 000 0000".to_string(),
                        password: "secret123".to_string(),
                    },
                )
                .await
                .unwrap()
        }

        async fn service(&self, minutes: i64, available: bool) -> Service {
            self.engine
                .add_service(
                    &self.admin,
                    ServiceRequest {
                        name: "General Medicine".to_string(),
                        description: String::new(),
                        estimated_wait_time: minutes,
                        is_available: available,
                    },
                )
                .await
                .unwrap()
        }

        async fn patient(&self, severity: Severity, service: Option<Uuid>) -> Patient {
            self.engine
                .register_patient(&self.admin, registration("Ada Obi", severity, service))
                .await
                .unwrap()
        }
    }

    fn sign_up(email: &str, role: UserRole) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            name: "Test User".to_string(),
            role,
            phone_number: None,
        }
    }

    fn registration(name: &str, severity: Severity, service: Option<Uuid>) -> RegisterPatientRequest {
        RegisterPatientRequest {
            name: name.to_string(),
            age: 42,
            gender: Gender::Female,
            phone_number: "+234 801 234 5678".to_string(),
            address: "4 Allen Ave".to_string(),
            emergency_contact: "Chidi Obi".to_string(),
            medical_history: None,
            severity,
            assigned_service: service,
            patient_account_id: None,
        }
    }

    fn status_update(status: PatientStatus) -> QueueUpdateRequest {
        QueueUpdateRequest {
            current_status: status,
            assigned_service: None,
            doctor_notes: None,
        }
    }

    #[tokio::test]
    async fn test_registration_computes_wait_once() {
        let fx = Fixture::new().await;
        let general = fx.service(15, true).await;

        let patient = fx.patient(Severity::Medium, Some(general.id)).await;
        assert_eq!(patient.wait_time, 35);
        assert_eq!(patient.current_status, PatientStatus::Waiting);
        assert_eq!(patient.hospital_id, fx.admin.hospital_id.unwrap());

        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;
        let updated = fx
            .engine
            .update_patient_queue(&nurse, patient.id, status_update(PatientStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(updated.wait_time, 35);
        assert_eq!(updated.assigned_service, Some(general.id));
        assert!(updated.last_updated >= patient.last_updated);
    }

    #[tokio::test]
    async fn test_critical_without_service_waits_zero() {
        let fx = Fixture::new().await;
        let patient = fx.patient(Severity::Critical, None).await;
        assert_eq!(patient.wait_time, 0);
    }

    #[tokio::test]
    async fn test_unavailable_service_rejected_without_write() {
        let fx = Fixture::new().await;
        let closed = fx.service(20, false).await;

        let result = fx
            .engine
            .register_patient(&fx.admin, registration("Ada Obi", Severity::Low, Some(closed.id)))
            .await;
        assert!(matches!(result, Err(MedQueueError::NotFound(_))));

        let patients = fx
            .engine
            .list_patients(&fx.admin, &PatientFilter::default())
            .await
            .unwrap();
        assert!(patients.is_empty());
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let fx = Fixture::new().await;

        let mut too_old = registration("Old", Severity::Low, None);
        too_old.age = 121;
        assert!(matches!(
            fx.engine.register_patient(&fx.admin, too_old).await,
            Err(MedQueueError::Validation(_))
        ));

        let mut no_name = registration("  ", Severity::Low, None);
        no_name.age = 0;
        assert!(matches!(
            fx.engine.register_patient(&fx.admin, no_name).await,
            Err(MedQueueError::Validation(_))
        ));

        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;
        assert!(matches!(
            fx.engine
                .register_patient(&nurse, registration("Ada", Severity::Low, None))
                .await,
            Err(MedQueueError::Permission(_))
        ));
    }

    #[tokio::test]
    async fn test_any_status_reachable_and_last_write_wins() {
        let fx = Fixture::new().await;
        let patient = fx.patient(Severity::High, None).await;

        for status in [
            PatientStatus::Completed,
            PatientStatus::Waiting,
            PatientStatus::Cancelled,
            PatientStatus::InProgress,
        ] {
            let updated = fx
                .engine
                .update_patient_queue(&fx.admin, patient.id, status_update(status))
                .await
                .unwrap();
            assert_eq!(updated.current_status, status);
        }

        let stored = fx.engine.get_patient(&fx.admin, patient.id).await.unwrap();
        assert_eq!(stored.current_status, PatientStatus::InProgress);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_reopen() {
        let fx = Fixture::with_settings(WorkflowSettings {
            strict_transitions: true,
            ..Default::default()
        })
        .await;
        let patient = fx.patient(Severity::Low, None).await;

        fx.engine
            .update_patient_queue(&fx.admin, patient.id, status_update(PatientStatus::Cancelled))
            .await
            .unwrap();
        let result = fx
            .engine
            .update_patient_queue(&fx.admin, patient.id, status_update(PatientStatus::Waiting))
            .await;
        assert!(matches!(result, Err(MedQueueError::InvalidStateTransition { .. })));
    }

    #[tokio::test]
    async fn test_patient_role_cannot_update_queue() {
        let fx = Fixture::new().await;
        let record = fx.patient(Severity::Low, None).await;
        let account = fx
            .engine
            .sign_up(sign_up("ada@mail.com", UserRole::Patient))
            .await
            .unwrap();

        let result = fx
            .engine
            .update_patient_queue(&account, record.id, status_update(PatientStatus::Completed))
            .await;
        assert!(matches!(result, Err(MedQueueError::Permission(_))));

        let stored = fx.engine.get_patient(&fx.admin, record.id).await.unwrap();
        assert_eq!(stored.current_status, PatientStatus::Waiting);
    }

    #[tokio::test]
    async fn test_unknown_service_on_update_leaves_record_untouched() {
        let fx = Fixture::new().await;
        let patient = fx.patient(Severity::Low, None).await;

        let result = fx
            .engine
            .update_patient_queue(
                &fx.admin,
                patient.id,
                QueueUpdateRequest {
                    current_status: PatientStatus::Completed,
                    assigned_service: Some(Uuid::new_v4()),
                    doctor_notes: Some("discharged".to_string()),
                },
            )
            .await;
        assert!(matches!(result, Err(MedQueueError::NotFound(_))));

        let stored = fx.engine.get_patient(&fx.admin, patient.id).await.unwrap();
        assert_eq!(stored.current_status, PatientStatus::Waiting);
        assert_eq!(stored.doctor_notes, None);
    }

    #[tokio::test]
    async fn test_missing_patient_is_not_found() {
        let fx = Fixture::new().await;
        let result = fx
            .engine
            .update_patient_queue(&fx.admin, Uuid::new_v4(), status_update(PatientStatus::Waiting))
            .await;
        assert!(matches!(result, Err(MedQueueError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recompute_wait_on_reassign() {
        let fx = Fixture::with_settings(WorkflowSettings {
            recompute_wait_on_reassign: true,
            ..Default::default()
        })
        .await;
        let cardio = fx.service(40, true).await;
        let patient = fx.patient(Severity::High, None).await;
        assert_eq!(patient.wait_time, 10);

        let updated = fx
            .engine
            .update_patient_queue(
                &fx.admin,
                patient.id,
                QueueUpdateRequest {
                    current_status: PatientStatus::Waiting,
                    assigned_service: Some(cardio.id),
                    doctor_notes: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.wait_time, 50);
        assert_eq!(updated.doctor_notes, None);
    }

    #[tokio::test]
    async fn test_role_scoped_patient_lists() {
        let fx = Fixture::new().await;
        let first = fx.patient(Severity::Low, None).await;
        let second = fx.patient(Severity::Critical, None).await;
        fx.engine
            .update_patient_queue(&fx.admin, first.id, status_update(PatientStatus::Completed))
            .await
            .unwrap();

        let all = fx
            .engine
            .list_patients(&fx.admin, &PatientFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let doctor = fx.staff("doc@stluke.org", UserRole::Doctor).await;
        let active = fx
            .engine
            .list_patients(&doctor, &PatientFilter::default())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let critical = fx
            .engine
            .list_patients(&fx.admin, &PatientFilter::default().with_severity(Severity::Critical))
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
    }

    #[tokio::test]
    async fn test_cross_hospital_access_blocked() {
        let fx = Fixture::new().await;
        let patient = fx.patient(Severity::Low, None).await;

        let other_admin = fx
            .engine
            .sign_up(sign_up("admin@mercy.org", UserRole::Admin))
            .await
            .unwrap();
        fx.engine
            .register_hospital(
                &other_admin,
                RegisterHospitalRequest {
                    name: "Mercy".to_string(),
                    region: "Abuja".to_string(),
                    address: "2 Garki".to_string(),
                },
            )
            .await
            .unwrap();
        let other_admin = fx.engine.get_user(other_admin.id).await.unwrap();

        assert!(matches!(
            fx.engine.get_patient(&other_admin, patient.id).await,
            Err(MedQueueError::Permission(_))
        ));
        assert!(matches!(
            fx.engine
                .update_patient_queue(&other_admin, patient.id, status_update(PatientStatus::Cancelled))
                .await,
            Err(MedQueueError::Permission(_))
        ));
    }

    #[tokio::test]
    async fn test_linked_patient_account_sees_own_record() {
        let fx = Fixture::new().await;
        let account = fx
            .engine
            .sign_up(sign_up("ada@mail.com", UserRole::Patient))
            .await
            .unwrap();

        let mut request = registration("Ada Obi", Severity::Medium, None);
        request.patient_account_id = Some(account.id);
        let record = fx.engine.register_patient(&fx.admin, request).await.unwrap();
        assert_eq!(record.id, account.id);

        let account = fx.engine.get_user(account.id).await.unwrap();
        assert_eq!(account.hospital_id, fx.admin.hospital_id);
        assert_eq!(fx.engine.get_patient(&account, account.id).await.unwrap().id, record.id);

        let other = fx.patient(Severity::Low, None).await;
        assert!(matches!(
            fx.engine.get_patient(&account, other.id).await,
            Err(MedQueueError::Permission(_))
        ));
    }

    #[tokio::test]
    async fn test_estimate_preview_matches_registration() {
        let fx = Fixture::new().await;
        let general = fx.service(15, true).await;

        let preview = fx
            .engine
            .estimate_wait(&fx.admin, "high", Some(general.id))
            .await
            .unwrap();
        let patient = fx.patient(Severity::High, Some(general.id)).await;
        assert_eq!(preview.total_minutes, patient.wait_time);
        assert_eq!(preview.base_minutes, 10);

        let unknown = fx.engine.estimate_wait(&fx.admin, "urgent", None).await.unwrap();
        assert_eq!(unknown.total_minutes, 30);
    }

    #[tokio::test]
    async fn test_service_management() {
        let fx = Fixture::new().await;
        let service = fx.service(10, true).await;

        let updated = fx
            .engine
            .update_service(
                &fx.admin,
                service.id,
                ServiceRequest {
                    name: "Radiology".to_string(),
                    description: "Imaging".to_string(),
                    estimated_wait_time: 45,
                    is_available: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.estimated_wait_time, 45);
        assert!(fx.engine.available_services(&fx.admin).await.unwrap().is_empty());

        let negative = ServiceRequest {
            name: "Lab".to_string(),
            description: String::new(),
            estimated_wait_time: -5,
            is_available: true,
        };
        assert!(matches!(
            fx.engine.add_service(&fx.admin, negative).await,
            Err(MedQueueError::Validation(_))
        ));

        fx.engine.remove_service(&fx.admin, service.id).await.unwrap();
        assert!(matches!(
            fx.engine.remove_service(&fx.admin, service.id).await,
            Err(MedQueueError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_staff_management() {
        let fx = Fixture::new().await;
        fx.staff("doc@stluke.org", UserRole::Doctor).await;

        let duplicate = fx
            .engine
            .add_staff(
                &fx.admin,
                StaffRequest {
                    name: "Dup".to_string(),
                    email: "DOC@stluke.org".to_string(),
                    role: UserRole::Nurse,
                    phone_number: "0800 111 2222".to_string(),
                    password: "secret123".to_string(),
                },
            )
            .await;
        assert!(matches!(duplicate, Err(MedQueueError::Validation(_))));

        let staff = fx.engine.list_staff(&fx.admin).await.unwrap();
        assert_eq!(staff.len(), 2);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let fx = Fixture::new().await;
        let user = fx.engine.authenticate("ADMIN@stluke.org", "secret123").await.unwrap();
        assert_eq!(user.id, fx.admin.id);
        assert!(matches!(
            fx.engine.authenticate("admin@stluke.org", "wrong-password").await,
            Err(MedQueueError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_appointments_flow() {
        let fx = Fixture::new().await;
        let service = fx.service(15, true).await;
        let doctor = fx.staff("doc@stluke.org", UserRole::Doctor).await;
        let other_doctor = fx.staff("doc2@stluke.org", UserRole::Doctor).await;
        let patient = fx.patient(Severity::Low, None).await;
        let today = Utc::now().date_naive();

        let missing_time = fx
            .engine
            .schedule_appointment(
                &fx.admin,
                ScheduleAppointmentRequest {
                    patient_id: Some(patient.id),
                    service_id: Some(service.id),
                    date: Some(today),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing_time, Err(MedQueueError::Validation(_))));

        let appointment = fx
            .engine
            .schedule_appointment(
                &fx.admin,
                ScheduleAppointmentRequest {
                    patient_id: Some(patient.id),
                    doctor_id: Some(doctor.id),
                    service_id: Some(service.id),
                    date: Some(today),
                    time: Some("09:30".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.patient_name, "Ada Obi");
        assert_eq!(appointment.service_name, "General Medicine");

        let mine = fx
            .engine
            .list_appointments(&doctor, &AppointmentFilter::default(), today)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert!(fx
            .engine
            .list_appointments(&other_doctor, &AppointmentFilter::default(), today)
            .await
            .unwrap()
            .is_empty());

        assert!(matches!(
            fx.engine
                .update_appointment_status(&other_doctor, appointment.id, AppointmentStatus::Completed)
                .await,
            Err(MedQueueError::Permission(_))
        ));
        let done = fx
            .engine
            .update_appointment_status(&doctor, appointment.id, AppointmentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_dashboard_by_role() {
        let fx = Fixture::new().await;
        let today = Utc::now().date_naive();
        let first = fx.patient(Severity::Critical, None).await;
        fx.patient(Severity::Low, None).await;
        fx.engine
            .update_patient_queue(&fx.admin, first.id, status_update(PatientStatus::Completed))
            .await
            .unwrap();

        let admin_view = fx.engine.dashboard(&fx.admin, today).await.unwrap();
        assert_eq!(admin_view.stats.total_patients, 2);
        assert_eq!(admin_view.stats.waiting_patients, 1);
        assert_eq!(admin_view.stats.critical_patients, 1);
        assert_eq!(admin_view.stats.completed_today, 1);
        assert!(admin_view.hospital.is_some());

        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;
        let nurse_view = fx.engine.dashboard(&nurse, today).await.unwrap();
        assert_eq!(nurse_view.stats.total_patients, 1);
        assert_eq!(nurse_view.stats.completed_today, 0);

        let loner = fx
            .engine
            .sign_up(sign_up("new@admin.org", UserRole::Admin))
            .await
            .unwrap();
        let empty = fx.engine.dashboard(&loner, today).await.unwrap();
        assert!(empty.hospital.is_none());
        assert_eq!(empty.stats, QueueStats::default());
    }

    #[tokio::test]
    async fn test_patient_dashboard_lists_soonest_appointment_first() {
        let fx = Fixture::new().await;
        let service = fx.service(15, true).await;
        let account = fx
            .engine
            .sign_up(sign_up("ada@mail.com", UserRole::Patient))
            .await
            .unwrap();
        let mut request = registration("Ada Obi", Severity::Medium, None);
        request.patient_account_id = Some(account.id);
        fx.engine.register_patient(&fx.admin, request).await.unwrap();
        let account = fx.engine.get_user(account.id).await.unwrap();

        let today = Utc::now().date_naive();
        for (offset, time) in [(7, "10:00"), (1, "14:00"), (1, "08:30"), (3, "09:00")] {
            fx.engine
                .schedule_appointment(
                    &account,
                    ScheduleAppointmentRequest {
                        service_id: Some(service.id),
                        date: Some(today + chrono::Duration::days(offset)),
                        time: Some(time.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let view = fx.engine.dashboard(&account, today).await.unwrap();
        let order: Vec<(i64, &str)> = view
            .appointments
            .iter()
            .map(|a| ((a.date - today).num_days(), a.time.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "08:30"), (1, "14:00"), (3, "09:00"), (7, "10:00")]);
        assert_eq!(view.patients.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_account_link_writes_nothing() {
        let fx = Fixture::new().await;
        let nurse = fx
            .engine
            .sign_up(sign_up("nurse@mail.com", UserRole::Nurse))
            .await
            .unwrap();

        let mut request = registration("Ada Obi", Severity::Medium, None);
        request.patient_account_id = Some(nurse.id);
        assert!(matches!(
            fx.engine.register_patient(&fx.admin, request).await,
            Err(MedQueueError::Validation(_))
        ));
        assert!(matches!(
            fx.engine.get_patient(&fx.admin, nurse.id).await,
            Err(MedQueueError::NotFound(_))
        ));
        assert_eq!(fx.engine.get_user(nurse.id).await.unwrap().hospital_id, None);
    }

    #[tokio::test]
    async fn test_analytics_admin_only() {
        let fx = Fixture::new().await;
        fx.patient(Severity::Critical, None).await;
        fx.patient(Severity::Low, None).await;

        let analytics = fx.engine.analytics(&fx.admin, Utc::now()).await.unwrap();
        assert_eq!(analytics.total_patients, 2);
        assert_eq!(analytics.patients_today, 2);
        assert_eq!(analytics.average_wait_time, 15);
        assert_eq!(analytics.critical_cases, 1);

        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;
        assert!(matches!(
            fx.engine.analytics(&nurse, Utc::now()).await,
            Err(MedQueueError::Permission(_))
        ));
    }

    #[tokio::test]
    async fn test_notifications() {
        let fx = Fixture::new().await;
        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;

        for title in ["Shift change", "Drill"] {
            fx.engine
                .send_notification(
                    &fx.admin,
                    NotificationRequest {
                        user_id: nurse.id,
                        title: title.to_string(),
                        message: "Details inside".to_string(),
                        notification_type: NotificationType::Warning,
                    },
                )
                .await
                .unwrap();
        }

        let inbox = fx.engine.list_notifications(&nurse).await.unwrap();
        assert_eq!(inbox.unread_count, 2);
        assert_eq!(inbox.notifications[0].title, "Drill");

        fx.engine
            .mark_notification_read(&nurse, inbox.notifications[0].id)
            .await
            .unwrap();
        assert_eq!(fx.engine.list_notifications(&nurse).await.unwrap().unread_count, 1);

        assert!(matches!(
            fx.engine
                .mark_notification_read(&fx.admin, inbox.notifications[1].id)
                .await,
            Err(MedQueueError::NotFound(_))
        ));
        assert_eq!(fx.engine.mark_all_read(&nurse).await.unwrap(), 1);
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl FlowObserver for RecordingObserver {
        fn patient_registered(&self, severity: Severity, wait_minutes: u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("registered:{}:{}", severity, wait_minutes));
        }

        fn status_changed(&self, from: PatientStatus, to: PatientStatus) {
            self.events.lock().unwrap().push(format!("status:{}:{}", from, to));
        }

        fn access_denied(&self, role: UserRole, action: Action) {
            self.events.lock().unwrap().push(format!("denied:{}:{}", role, action));
        }
    }

    #[tokio::test]
    async fn test_observer_receives_events() {
        let observer = Arc::new(RecordingObserver::default());
        let fx = Fixture::new().await;
        let engine = WorkflowEngine::new(fx.engine.store.clone()).with_observer(observer.clone());

        let patient = engine
            .register_patient(&fx.admin, registration("Ada", Severity::High, None))
            .await
            .unwrap();
        engine
            .update_patient_queue(&fx.admin, patient.id, status_update(PatientStatus::InProgress))
            .await
            .unwrap();
        let nurse = fx.staff("nurse@stluke.org", UserRole::Nurse).await;
        let _ = engine.analytics(&nurse, Utc::now()).await;

        let events = observer.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "registered:high:10".to_string(),
                "status:waiting:in-progress".to_string(),
                "denied:nurse:ViewAnalytics".to_string(),
            ]
        );
    }
}
