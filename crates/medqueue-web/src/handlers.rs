//! HTTP处理器
//!
//! 处理器只负责参数提取与响应封装，业务规则全部在工作流引擎中执行。

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use medqueue_core::{
    utils::parse_filter_value, AppointmentStatusRequest, MedQueueError, NotificationRequest,
    QueueUpdateRequest, RegisterHospitalRequest, RegisterPatientRequest,
    ScheduleAppointmentRequest, ServiceRequest, StaffRequest, User,
};
use medqueue_workflow::{AppointmentFilter, PatientFilter};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::server::AppState;

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 指标导出处理器
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let Some(metrics) = state.metrics.as_ref() else {
        return (StatusCode::NOT_FOUND, "metrics disabled".to_string()).into_response();
    };

    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics".to_string())
                .into_response()
        }
    }
}

// ---- 医院 ----

pub async fn register_hospital(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<RegisterHospitalRequest>,
) -> ApiResult<impl IntoResponse> {
    let hospital = state.engine.register_hospital(&user, request).await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

pub async fn current_hospital(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.get_hospital(&user).await?))
}

// ---- 服务 ----

pub async fn list_services(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.list_services(&user).await?))
}

pub async fn available_services(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.available_services(&user).await?))
}

pub async fn add_service(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<ServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let service = state.engine.add_service(&user, request).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<ServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.update_service(&user, id, request).await?))
}

pub async fn remove_service(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.engine.remove_service(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- 员工 ----

pub async fn list_staff(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.list_staff(&user).await?))
}

pub async fn add_staff(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<StaffRequest>,
) -> ApiResult<impl IntoResponse> {
    let staff = state.engine.add_staff(&user, request).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

// ---- 患者队列 ----

/// 患者列表查询参数，`all` 或空值表示不过滤
#[derive(Debug, Default, Deserialize)]
pub struct PatientQueryParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub search: Option<String>,
}

impl PatientQueryParams {
    fn into_filter(self) -> Result<PatientFilter, MedQueueError> {
        Ok(PatientFilter {
            status: parse_filter_value(self.status.as_deref())?,
            severity: parse_filter_value(self.severity.as_deref())?,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<PatientQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    Ok(Json(state.engine.list_patients(&user, &filter).await?))
}

pub async fn register_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<RegisterPatientRequest>,
) -> ApiResult<impl IntoResponse> {
    let patient = state.engine.register_patient(&user, request).await?;
    info!("Registered patient {} with wait {} min", patient.id, patient.wait_time);
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.get_patient(&user, id).await?))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<QueueUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.update_patient_queue(&user, id, request).await?))
}

/// 候诊时间预览请求，严重程度按原始标签接收
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub severity: String,
    #[serde(default)]
    pub assigned_service: Option<Uuid>,
}

pub async fn estimate_wait(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<EstimateRequest>,
) -> ApiResult<impl IntoResponse> {
    let estimate = state
        .engine
        .estimate_wait(&user, &request.severity, request.assigned_service)
        .await?;
    Ok(Json(estimate))
}

// ---- 预约 ----

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQueryParams {
    pub status: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
}

impl AppointmentQueryParams {
    fn into_filter(self) -> Result<AppointmentFilter, MedQueueError> {
        Ok(AppointmentFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            status: parse_filter_value(self.status.as_deref())?,
            window: parse_filter_value(self.date.as_deref())?.unwrap_or_default(),
        })
    }
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<AppointmentQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let today = Utc::now().date_naive();
    Ok(Json(state.engine.list_appointments(&user, &filter, today).await?))
}

pub async fn schedule_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<ScheduleAppointmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state.engine.schedule_appointment(&user, request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.get_appointment(&user, id).await?))
}

pub async fn update_appointment_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<AppointmentStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .engine
        .update_appointment_status(&user, id, request.status)
        .await?;
    Ok(Json(appointment))
}

// ---- 工作台与统计 ----

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    Ok(Json(state.engine.dashboard(&user, today).await?))
}

pub async fn analytics(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.analytics(&user, Utc::now()).await?))
}

// ---- 通知 ----

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.list_notifications(&user).await?))
}

pub async fn send_notification(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<NotificationRequest>,
) -> ApiResult<impl IntoResponse> {
    let notification = state.engine.send_notification(&user, request).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.engine.mark_notification_read(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    let updated = state.engine.mark_all_read(&user).await?;
    Ok(Json(json!({ "updated": updated })))
}
