use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::{
        AdminActor,
        ApprovalAction,
        ApprovalDecision,
        ApprovalRequest,
        ApprovalStatus,
        NewApprovalRequest,
    },
    helpers::new_request_id,
    traits::{ApprovalManagement, AuditLog, PaymentEngineError, SettingsManagement},
};

pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";
pub const MAINTENANCE_MESSAGE_KEY: &str = "maintenance_message";

// The executor future is awaited in place by `decide`, never spawned, so it does not need to be `Send`.
type Executor<B> =
    Arc<dyn Fn(B, ApprovalAction) -> Pin<Box<dyn Future<Output = Result<(), PaymentEngineError>>>> + Send + Sync>;

/// Peer-review governance for sensitive admin actions.
///
/// An admin files a request describing the action; a *different* admin approves or rejects it. Approval runs
/// the executor registered for the action type. Executors must be idempotent: the approval record is written
/// first and stands even if the executor fails, so a retry of the same action must be harmless.
pub struct ApprovalApi<B> {
    db: B,
    executors: HashMap<&'static str, Executor<B>>,
}

impl<B> ApprovalApi<B>
where B: ApprovalManagement + AuditLog + SettingsManagement + Clone + Send + 'static
{
    pub fn new(db: B) -> Self {
        let mut api = Self { db, executors: HashMap::new() };
        api.register_executor("MAINTENANCE_TOGGLE", Arc::new(|db: B, action| {
            Box::pin(async move {
                let ApprovalAction::MaintenanceToggle(toggle) = action;
                db.set_setting(MAINTENANCE_MODE_KEY, if toggle.enabled { "true" } else { "false" }).await?;
                if let Some(message) = &toggle.message {
                    db.set_setting(MAINTENANCE_MESSAGE_KEY, message).await?;
                }
                info!("🔐️ Maintenance mode set to {}", toggle.enabled);
                Ok(())
            })
        }));
        api
    }

    pub fn register_executor(&mut self, action_type: &'static str, executor: Executor<B>) {
        self.executors.insert(action_type, executor);
    }

    /// Files a new request. It enters the queue as PENDING no matter who the requester is.
    pub async fn create_request(
        &self,
        action: ApprovalAction,
        requester: AdminActor,
    ) -> Result<ApprovalRequest, PaymentEngineError> {
        let request = NewApprovalRequest { request_id: new_request_id(), action, requester: requester.clone() };
        let request = self.db.insert_approval_request(request).await?;
        self.audit(&requester, "APPROVAL_REQUESTED", &format!("{} ({})", request.action_type, request.request_id))
            .await;
        info!("🔐️ {} requested {} ({})", requester.name, request.action_type, request.request_id);
        Ok(request)
    }

    pub async fn list_pending(&self) -> Result<Vec<ApprovalRequest>, PaymentEngineError> {
        self.db.fetch_pending_approvals().await
    }

    pub async fn fetch_request(&self, request_id: &str) -> Result<Option<ApprovalRequest>, PaymentEngineError> {
        self.db.fetch_approval_request(request_id).await
    }

    /// Resolves a pending request. Resolution is terminal: the write is conditioned on the request still being
    /// PENDING, so two admins racing to decide cannot both land. Self-approval is refused outright and leaves
    /// the request in the queue.
    pub async fn decide(
        &self,
        request_id: &str,
        decision: ApprovalDecision,
        approver: &AdminActor,
        reason: Option<&str>,
    ) -> Result<ApprovalRequest, PaymentEngineError> {
        let request = self
            .db
            .fetch_approval_request(request_id)
            .await?
            .ok_or_else(|| PaymentEngineError::not_found(format!("approval request {request_id}")))?;
        if request.status != ApprovalStatus::Pending {
            return Err(PaymentEngineError::invalid_state(format!(
                "Approval request {request_id} was already resolved ({})",
                request.status
            )));
        }
        if decision == ApprovalDecision::Approve && approver.id == request.requester_id {
            warn!("🔐️ {} tried to approve their own request {request_id}", approver.name);
            self.audit(approver, "APPROVAL_SELF_APPROVE_DENIED", &format!("{} ({request_id})", request.action_type))
                .await;
            return Err(PaymentEngineError::Forbidden("Requests cannot be approved by their requester".to_string()));
        }
        let status = match decision {
            ApprovalDecision::Approve => ApprovalStatus::Approved,
            ApprovalDecision::Reject => ApprovalStatus::Rejected,
        };
        let resolved = self
            .db
            .resolve_approval_request(request_id, status, approver, reason)
            .await?
            .ok_or_else(|| {
                PaymentEngineError::Conflict(format!("Approval request {request_id} was resolved concurrently"))
            })?;
        match decision {
            ApprovalDecision::Reject => {
                self.audit(approver, "APPROVAL_REJECTED", &format!("{} ({request_id})", resolved.action_type)).await;
                info!("🔐️ {} rejected request {request_id}", approver.name);
            },
            ApprovalDecision::Approve => {
                info!("🔐️ {} approved request {request_id}. Executing {}", approver.name, resolved.action_type);
                let outcome = self.execute(&resolved).await;
                let details = match &outcome {
                    Ok(()) => format!("{} ({request_id})", resolved.action_type),
                    Err(e) => format!("{} ({request_id}). Execution failed: {e}", resolved.action_type),
                };
                if let Err(e) = &outcome {
                    error!("🔐️ Executor for {} failed on request {request_id}: {e}", resolved.action_type);
                }
                self.audit(approver, "APPROVAL_APPROVED", &details).await;
            },
        }
        Ok(resolved)
    }

    async fn execute(&self, request: &ApprovalRequest) -> Result<(), PaymentEngineError> {
        match self.executors.get(request.action_type.as_str()) {
            Some(executor) => executor(self.db.clone(), request.action.0.clone()).await,
            None => Err(PaymentEngineError::Unexpected(format!(
                "No executor registered for action type {}",
                request.action_type
            ))),
        }
    }

    async fn audit(&self, admin: &AdminActor, action: &str, details: &str) {
        if let Err(e) = self.db.append_audit(&admin.id, action, details).await {
            error!("🔐️ Could not write audit entry [{action}] {details}: {e}");
        }
    }
}
