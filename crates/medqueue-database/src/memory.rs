//! 内存存储
//!
//! 以读写锁保护的 HashMap 实现全部仓储接口，用于开发模式与测试。
//! 每条记录带插入序号，排序字段相同时较晚插入的记录排在前面。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medqueue_core::{
    Appointment, AppointmentQuery, AppointmentRepository, AppointmentStatus, Hospital,
    HospitalRepository, MedQueueError, Notification, NotificationRepository, Patient,
    PatientQuery, PatientRepository, PatientUpdate, Result, Service, User, UserAccount,
    UserRepository, UserRole,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Tables {
    next_seq: u64,
    users: HashMap<Uuid, Entry<UserAccount>>,
    hospitals: HashMap<Uuid, Hospital>,
    patients: HashMap<Uuid, Entry<Patient>>,
    appointments: HashMap<Uuid, Entry<Appointment>>,
    notifications: HashMap<Uuid, Entry<Notification>>,
}

impl Tables {
    fn entry<T>(&mut self, value: T) -> Entry<T> {
        self.next_seq += 1;
        Entry {
            seq: self.next_seq,
            value,
        }
    }
}

/// 按键倒序排列，键相同时后插入者在前
fn newest_first<T, K, F>(entries: Vec<&Entry<T>>, key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut entries = entries;
    entries.sort_by(|a, b| key(&b.value).cmp(&key(&a.value)).then(b.seq.cmp(&a.seq)));
    entries.into_iter().map(|e| e.value.clone()).collect()
}

/// 内存存储
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn create_patient(&self, patient: &Patient) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(MedQueueError::Validation(format!(
                "Patient {} already exists",
                patient.id
            )));
        }
        let entry = tables.entry(patient.clone());
        tables.patients.insert(patient.id, entry);
        Ok(())
    }

    async fn create_linked_patient(&self, patient: &Patient) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(MedQueueError::Validation(format!(
                "Patient {} already exists",
                patient.id
            )));
        }
        match tables.users.get(&patient.id) {
            Some(e) if e.value.user.role == UserRole::Patient => {}
            _ => {
                return Err(MedQueueError::NotFound(format!(
                    "Patient account {}",
                    patient.id
                )))
            }
        }

        let entry = tables.entry(patient.clone());
        tables.patients.insert(patient.id, entry);
        if let Some(account) = tables.users.get_mut(&patient.id) {
            account.value.user.hospital_id = Some(patient.hospital_id);
        }
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables.patients.get(&id).map(|e| e.value.clone()))
    }

    async fn update_patient(&self, id: Uuid, update: &PatientUpdate) -> Result<Patient> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .patients
            .get_mut(&id)
            .ok_or_else(|| MedQueueError::NotFound(format!("Patient {}", id)))?;
        update.apply(&mut entry.value);
        Ok(entry.value.clone())
    }

    async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>> {
        let tables = self.tables.read().await;
        let matching = tables
            .patients
            .values()
            .filter(|e| query.matches(&e.value))
            .collect();

        let mut patients = newest_first(matching, |p: &Patient| p.created_at);
        if let Some(limit) = query.limit {
            patients.truncate(limit);
        }
        Ok(patients)
    }
}

#[async_trait]
impl HospitalRepository for InMemoryStore {
    async fn create_hospital(&self, hospital: &Hospital) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.hospitals.contains_key(&hospital.id) {
            return Err(MedQueueError::Validation(format!(
                "Hospital {} already exists",
                hospital.id
            )));
        }
        tables.hospitals.insert(hospital.id, hospital.clone());
        Ok(())
    }

    async fn get_hospital(&self, id: Uuid) -> Result<Option<Hospital>> {
        Ok(self.tables.read().await.hospitals.get(&id).cloned())
    }

    async fn get_services(&self, hospital_id: Uuid) -> Result<Vec<Service>> {
        self.tables
            .read()
            .await
            .hospitals
            .get(&hospital_id)
            .map(|h| h.services.clone())
            .ok_or_else(|| MedQueueError::NotFound(format!("Hospital {}", hospital_id)))
    }

    async fn replace_services(&self, hospital_id: Uuid, services: &[Service]) -> Result<()> {
        let mut tables = self.tables.write().await;
        let hospital = tables
            .hospitals
            .get_mut(&hospital_id)
            .ok_or_else(|| MedQueueError::NotFound(format!("Hospital {}", hospital_id)))?;
        hospital.services = services.to_vec();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, account: &UserAccount) -> Result<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .users
            .values()
            .any(|e| e.value.user.email == account.user.email);
        if duplicate || tables.users.contains_key(&account.user.id) {
            return Err(MedQueueError::Validation(format!(
                "An account with email {} already exists",
                account.user.email
            )));
        }
        let entry = tables.entry(account.clone());
        tables.users.insert(account.user.id, entry);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|e| e.value.user.clone()))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|e| e.value.user.email == email)
            .map(|e| e.value.clone()))
    }

    async fn list_users(&self, hospital_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<&Entry<UserAccount>> = tables
            .users
            .values()
            .filter(|e| e.value.user.hospital_id == Some(hospital_id))
            .filter(|e| role.map_or(true, |r| e.value.user.role == r))
            .collect();
        users.sort_by_key(|e| e.seq);
        Ok(users.into_iter().map(|e| e.value.user.clone()).collect())
    }

    async fn set_user_hospital(&self, user_id: Uuid, hospital_id: Uuid) -> Result<User> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| MedQueueError::NotFound(format!("User {}", user_id)))?;
        entry.value.user.hospital_id = Some(hospital_id);
        Ok(entry.value.user.clone())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn create_appointment(&self, appointment: &Appointment) -> Result<()> {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(appointment.clone());
        tables.appointments.insert(appointment.id, entry);
        Ok(())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let tables = self.tables.read().await;
        Ok(tables.appointments.get(&id).map(|e| e.value.clone()))
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        last_updated: DateTime<Utc>,
    ) -> Result<Appointment> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .appointments
            .get_mut(&id)
            .ok_or_else(|| MedQueueError::NotFound(format!("Appointment {}", id)))?;
        entry.value.status = status;
        entry.value.last_updated = last_updated;
        Ok(entry.value.clone())
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let matching = tables
            .appointments
            .values()
            .filter(|e| query.matches(&e.value))
            .collect();
        Ok(newest_first(matching, |a: &Appointment| (a.date, a.time.clone())))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn create_notification(&self, notification: &Notification) -> Result<()> {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(notification.clone());
        tables.notifications.insert(notification.id, entry);
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let matching = tables
            .notifications
            .values()
            .filter(|e| e.value.user_id == user_id)
            .collect();
        Ok(newest_first(matching, |n: &Notification| n.created_at))
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.notifications.get_mut(&id) {
            Some(entry) if entry.value.user_id == user_id => {
                entry.value.read = true;
                Ok(())
            }
            _ => Err(MedQueueError::NotFound(format!("Notification {}", id))),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for entry in tables.notifications.values_mut() {
            if entry.value.user_id == user_id && !entry.value.read {
                entry.value.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use medqueue_core::{AppointmentScope, Gender, NotificationType, PatientStatus, Severity};

    fn patient(hospital_id: Uuid, created_at: DateTime<Utc>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: "Stored".to_string(),
            age: 61,
            gender: Gender::Male,
            phone_number: "0803".to_string(),
            address: "Ring Road".to_string(),
            emergency_contact: "Kin".to_string(),
            medical_history: Some("asthma".to_string()),
            current_status: PatientStatus::Waiting,
            severity: Severity::Medium,
            assigned_service: None,
            hospital_id,
            wait_time: 20,
            doctor_notes: None,
            created_at,
            last_updated: created_at,
        }
    }

    fn account(email: &str, hospital_id: Option<Uuid>) -> UserAccount {
        UserAccount {
            user: User {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: "Account".to_string(),
                role: UserRole::Nurse,
                phone_number: None,
                hospital_id,
                created_at: Utc::now(),
            },
            password_hash: "salt$digest".to_string(),
        }
    }

    #[tokio::test]
    async fn test_patients_newest_first_with_limit() {
        let store = InMemoryStore::new();
        let hospital_id = Uuid::new_v4();
        let now = Utc::now();

        let old = patient(hospital_id, now - Duration::hours(2));
        let new = patient(hospital_id, now);
        let elsewhere = patient(Uuid::new_v4(), now);
        for p in [&old, &new, &elsewhere] {
            store.create_patient(p).await.unwrap();
        }

        let listed = store
            .list_patients(&PatientQuery::for_hospital(hospital_id))
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![new.id, old.id]);

        let limited = store
            .list_patients(&PatientQuery::for_hospital(hospital_id).with_limit(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, new.id);
    }

    #[tokio::test]
    async fn test_duplicate_patient_rejected() {
        let store = InMemoryStore::new();
        let record = patient(Uuid::new_v4(), Utc::now());
        store.create_patient(&record).await.unwrap();
        assert!(matches!(
            store.create_patient(&record).await,
            Err(MedQueueError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_patient() {
        let store = InMemoryStore::new();
        let update = PatientUpdate {
            current_status: PatientStatus::Completed,
            assigned_service: None,
            doctor_notes: None,
            wait_time: None,
            last_updated: Utc::now(),
        };
        assert!(matches!(
            store.update_patient(Uuid::new_v4(), &update).await,
            Err(MedQueueError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_users_by_email_and_hospital() {
        let store = InMemoryStore::new();
        let hospital_id = Uuid::new_v4();
        let nurse = account("nurse@ward.org", Some(hospital_id));
        store.create_user(&nurse).await.unwrap();

        assert!(matches!(
            store.create_user(&account("nurse@ward.org", None)).await,
            Err(MedQueueError::Validation(_))
        ));
        let found = store.find_account_by_email("nurse@ward.org").await.unwrap();
        assert_eq!(found.map(|a| a.user.id), Some(nurse.user.id));

        let loner = account("loner@ward.org", None);
        store.create_user(&loner).await.unwrap();
        store.set_user_hospital(loner.user.id, hospital_id).await.unwrap();

        let staff = store.list_users(hospital_id, Some(UserRole::Nurse)).await.unwrap();
        assert_eq!(staff.len(), 2);
        assert!(store.list_users(hospital_id, Some(UserRole::Doctor)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_linked_patient_written_with_account() {
        let store = InMemoryStore::new();
        let hospital_id = Uuid::new_v4();

        let mut holder = account("holder@ward.org", None);
        holder.user.role = UserRole::Patient;
        store.create_user(&holder).await.unwrap();

        let mut record = patient(hospital_id, Utc::now());
        record.id = holder.user.id;
        store.create_linked_patient(&record).await.unwrap();

        let linked = store.get_user(holder.user.id).await.unwrap().unwrap();
        assert_eq!(linked.hospital_id, Some(hospital_id));
        assert!(store.get_patient(record.id).await.unwrap().is_some());

        // 非患者账号不写入任何记录
        let nurse = account("nurse@ward.org", None);
        store.create_user(&nurse).await.unwrap();
        let mut orphan = patient(hospital_id, Utc::now());
        orphan.id = nurse.user.id;
        assert!(matches!(
            store.create_linked_patient(&orphan).await,
            Err(MedQueueError::NotFound(_))
        ));
        assert!(store.get_patient(orphan.id).await.unwrap().is_none());
        let untouched = store.get_user(nurse.user.id).await.unwrap().unwrap();
        assert_eq!(untouched.hospital_id, None);
    }

    #[tokio::test]
    async fn test_services_require_hospital() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_services(Uuid::new_v4()).await,
            Err(MedQueueError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_appointments_scoped_and_sorted() {
        let store = InMemoryStore::new();
        let hospital_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();

        for (d, owner) in [(10, patient_id), (20, patient_id), (15, Uuid::new_v4())] {
            let now = Utc::now();
            store
                .create_appointment(&Appointment {
                    id: Uuid::new_v4(),
                    patient_id: owner,
                    patient_name: "P".to_string(),
                    doctor_id: None,
                    doctor_name: None,
                    service_id: Uuid::new_v4(),
                    service_name: "S".to_string(),
                    date: day(d),
                    time: "08:00".to_string(),
                    status: AppointmentStatus::Scheduled,
                    hospital_id,
                    created_at: now,
                    last_updated: now,
                })
                .await
                .unwrap();
        }

        let mine = store
            .list_appointments(&AppointmentQuery::new(AppointmentScope::Patient(patient_id)))
            .await
            .unwrap();
        assert_eq!(mine.iter().map(|a| a.date).collect::<Vec<_>>(), vec![day(20), day(10)]);

        let upcoming = store
            .list_appointments(
                &AppointmentQuery::new(AppointmentScope::Hospital(hospital_id)).from_date(day(15)),
            )
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 2);
    }

    #[tokio::test]
    async fn test_notifications_owned_by_user() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let note = Notification {
            id: Uuid::new_v4(),
            title: "Heads up".to_string(),
            message: "Ward B closed".to_string(),
            notification_type: NotificationType::Info,
            read: false,
            user_id: owner,
            created_at: Utc::now(),
        };
        store.create_notification(&note).await.unwrap();

        assert!(matches!(
            store.mark_notification_read(Uuid::new_v4(), note.id).await,
            Err(MedQueueError::NotFound(_))
        ));
        assert_eq!(store.mark_all_notifications_read(owner).await.unwrap(), 1);
        assert_eq!(store.mark_all_notifications_read(owner).await.unwrap(), 0);
        assert!(store.list_notifications(owner).await.unwrap()[0].read);
    }
}
