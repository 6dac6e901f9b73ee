//! # MedQueue Core
//!
//! 患者分诊与排队系统的核心模块，提供领域模型、请求对象、错误定义、
//! 输入校验以及存储层的仓储接口。

pub mod error;
pub mod models;
pub mod repository;
pub mod requests;
pub mod utils;
pub mod validation;

pub use error::{MedQueueError, Result};
pub use models::*;
pub use repository::{
    AppointmentQuery, AppointmentRepository, AppointmentScope, FlowStore, HospitalRepository,
    NotificationRepository, PatientQuery, PatientRepository, PatientUpdate, UserAccount,
    UserRepository,
};
pub use requests::*;
