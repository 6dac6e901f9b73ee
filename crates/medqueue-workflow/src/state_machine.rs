//! 排队状态机
//!
//! 管理患者 `currentStatus` 的取值与转换。默认策略允许任意状态之间互相转换，
//! 唯一的守卫是调用方角色；严格策略则禁止离开终态。

use medqueue_core::{MedQueueError, PatientStatus, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 转换策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// 任意状态可写入任意状态
    #[default]
    Permissive,
    /// 候诊 → 就诊中/取消，就诊中 → 候诊/完成/取消，终态不可离开
    Strict,
}

/// 患者排队状态机
#[derive(Debug, Clone)]
pub struct PatientStateMachine {
    policy: TransitionPolicy,
    transitions: HashSet<(PatientStatus, PatientStatus)>,
}

impl PatientStateMachine {
    /// 创建默认（宽松）状态机
    pub fn new() -> Self {
        Self::with_policy(TransitionPolicy::Permissive)
    }

    pub fn with_policy(policy: TransitionPolicy) -> Self {
        let mut transitions = HashSet::new();

        // 写入相同状态总是允许，用于只更新服务或医嘱
        for status in PatientStatus::ALL {
            transitions.insert((*status, *status));
        }

        match policy {
            TransitionPolicy::Permissive => {
                for from in PatientStatus::ALL {
                    for to in PatientStatus::ALL {
                        transitions.insert((*from, *to));
                    }
                }
            }
            TransitionPolicy::Strict => {
                transitions.insert((PatientStatus::Waiting, PatientStatus::InProgress));
                transitions.insert((PatientStatus::Waiting, PatientStatus::Cancelled));
                transitions.insert((PatientStatus::InProgress, PatientStatus::Waiting));
                transitions.insert((PatientStatus::InProgress, PatientStatus::Completed));
                transitions.insert((PatientStatus::InProgress, PatientStatus::Cancelled));
            }
        }

        Self { policy, transitions }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// 新登记患者的初始状态
    pub fn initial_state() -> PatientStatus {
        PatientStatus::Waiting
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: PatientStatus, to: PatientStatus) -> bool {
        self.transitions.contains(&(from, to))
    }

    /// 执行状态转换
    pub fn transition(&self, from: PatientStatus, to: PatientStatus) -> Result<PatientStatus> {
        if self.can_transition(from, to) {
            Ok(to)
        } else {
            Err(MedQueueError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// 获取所有可能的状态
    pub fn get_all_states() -> Vec<PatientStatus> {
        PatientStatus::ALL.to_vec()
    }

    /// 获取当前状态可以转入的状态，按声明顺序
    pub fn get_possible_targets(&self, current: PatientStatus) -> Vec<PatientStatus> {
        PatientStatus::ALL
            .iter()
            .copied()
            .filter(|to| self.can_transition(current, *to))
            .collect()
    }
}

impl Default for PatientStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
