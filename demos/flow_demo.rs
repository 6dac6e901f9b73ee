//! 患者流程演示程序
//!
//! 使用内存存储演示医院注册、服务配置、分诊登记、排队状态更新与统计

use anyhow::Result;
use chrono::Utc;
use medqueue_core::{
    Gender, PatientStatus, QueueUpdateRequest, RegisterHospitalRequest, RegisterPatientRequest,
    ServiceRequest, Severity, SignUpRequest, StaffRequest, UserRole,
};
use medqueue_database::InMemoryStore;
use medqueue_workflow::{PatientFilter, WorkflowEngine};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let engine = WorkflowEngine::new(Arc::new(InMemoryStore::new()));
    println!("🚀 MedQueue 患者流程演示\n");

    // 1. 管理员注册并创建医院
    let admin = engine
        .sign_up(SignUpRequest {
            email: "admin@general.org".to_string(),
            password: "admin123".to_string(),
            name: "Dr. Admin".to_string(),
            role: UserRole::Admin,
            phone_number: None,
        })
        .await?;
    let hospital = engine
        .register_hospital(
            &admin,
            RegisterHospitalRequest {
                name: "General Hospital".to_string(),
                region: "North".to_string(),
                address: "1 Main St".to_string(),
            },
        )
        .await?;
    let admin = engine.get_user(admin.id).await?;
    println!("✅ 医院已注册: {} ({})", hospital.name, hospital.id);

    // 2. 配置服务
    let mut services = Vec::new();
    for (name, wait) in [("Emergency", 5), ("Radiology", 15), ("General Practice", 25)] {
        let service = engine
            .add_service(
                &admin,
                ServiceRequest {
                    name: name.to_string(),
                    description: String::new(),
                    estimated_wait_time: wait,
                    is_available: true,
                },
            )
            .await?;
        services.push(service);
    }
    println!("✅ 配置了 {} 个服务", services.len());

    // 3. 添加前台员工
    let receptionist = engine
        .add_staff(
            &admin,
            StaffRequest {
                name: "Front Desk".to_string(),
                email: "desk@general.org".to_string(),
                role: UserRole::Receptionist,
                phone_number: "+1 555 0101".to_string(),
                password: "desk1234".to_string(),
            },
        )
        .await?;
    println!("✅ 前台员工已添加: {}", receptionist.name);

    // 4. 分诊登记
    let arrivals = [
        ("Ana", Severity::Critical, 0),
        ("Ben", Severity::High, 1),
        ("Caro", Severity::Medium, 2),
        ("Dev", Severity::Low, 2),
    ];
    let mut patients = Vec::new();
    for (name, severity, service_index) in arrivals {
        let patient = engine
            .register_patient(
                &receptionist,
                RegisterPatientRequest {
                    name: name.to_string(),
                    age: 40,
                    gender: Gender::Other,
                    phone_number: "+1 555 0199".to_string(),
                    address: "2 Side St".to_string(),
                    emergency_contact: "Family".to_string(),
                    medical_history: None,
                    severity,
                    assigned_service: Some(services[service_index].id),
                    patient_account_id: None,
                },
            )
            .await?;
        println!(
            "📋 登记患者 {} (严重程度: {}, 服务: {}, 预计等待 {} 分钟)",
            patient.name, patient.severity, services[service_index].name, patient.wait_time
        );
        patients.push(patient);
    }

    // 5. 更新排队状态
    let first = &patients[0];
    engine
        .update_patient_queue(
            &admin,
            first.id,
            QueueUpdateRequest {
                current_status: PatientStatus::InProgress,
                assigned_service: None,
                doctor_notes: Some("Stabilised on arrival".to_string()),
            },
        )
        .await?;
    engine
        .update_patient_queue(
            &admin,
            first.id,
            QueueUpdateRequest {
                current_status: PatientStatus::Completed,
                assigned_service: None,
                doctor_notes: None,
            },
        )
        .await?;
    println!("\n🔄 {} 已完成就诊", first.name);

    // 6. 查看候诊队列
    let waiting = engine
        .list_patients(&admin, &PatientFilter::default().with_status(PatientStatus::Waiting))
        .await?;
    println!("\n📊 候诊队列 ({} 人):", waiting.len());
    for patient in &waiting {
        println!("   {} - {} - {} 分钟", patient.name, patient.severity, patient.wait_time);
    }

    // 7. 工作台与统计
    let dashboard = engine.dashboard(&admin, Utc::now().date_naive()).await?;
    println!("\n🏥 工作台:");
    println!("   总患者数: {}", dashboard.stats.total_patients);
    println!("   候诊中: {}", dashboard.stats.waiting_patients);
    println!("   危急患者: {}", dashboard.stats.critical_patients);
    println!("   今日完成: {}", dashboard.stats.completed_today);

    let analytics = engine.analytics(&admin, Utc::now()).await?;
    println!("\n📈 统计:");
    println!("   平均等待时间: {} 分钟", analytics.average_wait_time);
    println!("   完成率: {}%", analytics.completion_rate);

    println!("\n🎉 演示完成!");
    Ok(())
}
