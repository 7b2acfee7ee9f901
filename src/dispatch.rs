//! Admin action dispatcher.
//!
//! Every mutation the console can perform is an [`AdminAction`] value. A
//! single static table maps each action to its backend route, so the
//! routing is inspectable and testable without any live session.
//! Client-side validation runs before anything touches the network; once
//! an action executes, the session forces a dashboard refresh whether the
//! backend accepted it or not.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use crate::error::{Result, RideopsError};
use crate::gateway::{Gateway, WriteOutcome};
use crate::types::{CommissionSettings, DriverStatus, VehicleType};

/// Minimum password length accepted client-side.
const MIN_PASSWORD_LEN: usize = 6;

/// Who a block/unblock action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    Driver,
    Passenger,
}

impl UserKind {
    fn as_str(self) -> &'static str {
        match self {
            UserKind::Driver => "driver",
            UserKind::Passenger => "passenger",
        }
    }
}

/// Form fields for creating or updating a driver. The photo rides along
/// as a multipart file part when present.
#[derive(Debug, Clone, Default)]
pub struct DriverForm {
    pub name: String,
    pub phone_number: String,
    pub vehicle_type: Option<VehicleType>,
    pub password: Option<String>,
    pub photo_path: Option<PathBuf>,
}

/// Profile fields for the signed-in admin.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub username: String,
    pub photo_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum AdminAction {
    AssignRide {
        ride_id: u64,
        driver_id: Option<u64>,
    },
    SetDriverStatus {
        driver_id: u64,
        status: DriverStatus,
    },
    CompleteRide {
        ride_id: u64,
    },
    CancelRide {
        ride_id: u64,
    },
    AddDriver(DriverForm),
    UpdateDriver {
        driver_id: u64,
        form: DriverForm,
    },
    DeleteDriver {
        driver_id: u64,
    },
    BlockUser {
        kind: UserKind,
        id: u64,
    },
    UnblockUser {
        kind: UserKind,
        id: u64,
    },
    ResolveFeedback {
        feedback_id: u64,
    },
    ResolveTicket {
        ticket_id: u64,
        response: Option<String>,
    },
    SaveSettings(Value),
    SaveCommissionRates(CommissionSettings),
    AddAdmin {
        username: String,
        password: String,
    },
    DeleteAdmin {
        admin_id: u64,
    },
    UpdateProfile(ProfileForm),
    ChangePassword {
        current: String,
        new: String,
        confirm: String,
    },
    CalculateEarnings {
        month: Option<String>,
    },
}

/// Route key, one per action variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AssignRide,
    SetDriverStatus,
    CompleteRide,
    CancelRide,
    AddDriver,
    UpdateDriver,
    DeleteDriver,
    BlockUser,
    UnblockUser,
    ResolveFeedback,
    ResolveTicket,
    SaveSettings,
    SaveCommissionRates,
    AddAdmin,
    DeleteAdmin,
    UpdateProfile,
    ChangePassword,
    CalculateEarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Multipart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub endpoint: &'static str,
    pub method: Method,
    pub body: BodyKind,
}

/// The one place backend routes are declared.
pub static ROUTES: Lazy<HashMap<ActionKind, Route>> = Lazy::new(|| {
    use ActionKind::*;
    use BodyKind::*;

    let mut table = HashMap::new();
    let mut add = |kind, endpoint, method, body| {
        table.insert(kind, Route { endpoint, method, body });
    };

    add(AssignRide, "assign-ride", Method::POST, Json);
    add(SetDriverStatus, "update-driver-status", Method::POST, Json);
    add(CompleteRide, "complete-ride", Method::POST, Json);
    add(CancelRide, "cancel-ride", Method::POST, Json);
    add(AddDriver, "add-driver", Method::POST, Multipart);
    add(UpdateDriver, "update-driver/{id}", Method::POST, Multipart);
    add(DeleteDriver, "delete-driver", Method::POST, Json);
    add(BlockUser, "users/block", Method::POST, Json);
    add(UnblockUser, "users/unblock", Method::POST, Json);
    add(ResolveFeedback, "feedback/resolve/{id}", Method::POST, Json);
    add(ResolveTicket, "support-tickets/{id}/resolve", Method::POST, Json);
    add(SaveSettings, "settings", Method::POST, Json);
    add(SaveCommissionRates, "commission-settings", Method::POST, Json);
    add(AddAdmin, "admins/add", Method::POST, Json);
    add(DeleteAdmin, "admins/delete", Method::POST, Json);
    add(UpdateProfile, "admins/update-profile", Method::POST, Multipart);
    add(ChangePassword, "admins/change-password", Method::POST, Json);
    add(CalculateEarnings, "earnings/calculate", Method::POST, Json);
    table
});

impl AdminAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            AdminAction::AssignRide { .. } => ActionKind::AssignRide,
            AdminAction::SetDriverStatus { .. } => ActionKind::SetDriverStatus,
            AdminAction::CompleteRide { .. } => ActionKind::CompleteRide,
            AdminAction::CancelRide { .. } => ActionKind::CancelRide,
            AdminAction::AddDriver(_) => ActionKind::AddDriver,
            AdminAction::UpdateDriver { .. } => ActionKind::UpdateDriver,
            AdminAction::DeleteDriver { .. } => ActionKind::DeleteDriver,
            AdminAction::BlockUser { .. } => ActionKind::BlockUser,
            AdminAction::UnblockUser { .. } => ActionKind::UnblockUser,
            AdminAction::ResolveFeedback { .. } => ActionKind::ResolveFeedback,
            AdminAction::ResolveTicket { .. } => ActionKind::ResolveTicket,
            AdminAction::SaveSettings(_) => ActionKind::SaveSettings,
            AdminAction::SaveCommissionRates(_) => ActionKind::SaveCommissionRates,
            AdminAction::AddAdmin { .. } => ActionKind::AddAdmin,
            AdminAction::DeleteAdmin { .. } => ActionKind::DeleteAdmin,
            AdminAction::UpdateProfile(_) => ActionKind::UpdateProfile,
            AdminAction::ChangePassword { .. } => ActionKind::ChangePassword,
            AdminAction::CalculateEarnings { .. } => ActionKind::CalculateEarnings,
        }
    }

    pub fn route(&self) -> &'static Route {
        &ROUTES[&self.kind()]
    }

    /// Backend path for this action, with the `{id}` segment filled in
    /// for the routes that address a single resource.
    pub fn endpoint(&self) -> String {
        let template = self.route().endpoint;
        match self {
            AdminAction::UpdateDriver { driver_id, .. } => {
                template.replace("{id}", &driver_id.to_string())
            }
            AdminAction::ResolveFeedback { feedback_id } => {
                template.replace("{id}", &feedback_id.to_string())
            }
            AdminAction::ResolveTicket { ticket_id, .. } => {
                template.replace("{id}", &ticket_id.to_string())
            }
            _ => template.to_string(),
        }
    }

    /// Reject actions the backend would bounce anyway, before any network
    /// traffic. Validation failures do not trigger a refresh.
    pub fn validate(&self) -> Result<()> {
        match self {
            AdminAction::AssignRide { driver_id: None, .. } => Err(RideopsError::Validation(
                "Please select a driver first".to_string(),
            )),
            AdminAction::AddDriver(form) => {
                if form.name.trim().is_empty() || form.phone_number.trim().is_empty() {
                    return Err(RideopsError::Validation(
                        "Driver name and phone number are required".to_string(),
                    ));
                }
                match &form.password {
                    Some(p) if p.len() < MIN_PASSWORD_LEN => Err(RideopsError::Validation(
                        format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
                    )),
                    Some(_) => Ok(()),
                    None => Err(RideopsError::Validation(
                        "A password is required for new drivers".to_string(),
                    )),
                }
            }
            AdminAction::AddAdmin { username, password } => {
                if username.trim().is_empty() {
                    return Err(RideopsError::Validation(
                        "Username is required".to_string(),
                    ));
                }
                if password.len() < MIN_PASSWORD_LEN {
                    return Err(RideopsError::Validation(format!(
                        "Password must be at least {MIN_PASSWORD_LEN} characters"
                    )));
                }
                Ok(())
            }
            AdminAction::ChangePassword { new, confirm, .. } => {
                if new.len() < MIN_PASSWORD_LEN {
                    return Err(RideopsError::Validation(format!(
                        "Password must be at least {MIN_PASSWORD_LEN} characters"
                    )));
                }
                if new != confirm {
                    return Err(RideopsError::Validation(
                        "Passwords do not match".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// JSON body for non-multipart actions.
    fn payload(&self) -> Value {
        match self {
            AdminAction::AssignRide { ride_id, driver_id } => {
                json!({ "ride_id": ride_id, "driver_id": driver_id })
            }
            AdminAction::SetDriverStatus { driver_id, status } => {
                json!({ "driver_id": driver_id, "status": status })
            }
            AdminAction::CompleteRide { ride_id } | AdminAction::CancelRide { ride_id } => {
                json!({ "ride_id": ride_id })
            }
            AdminAction::DeleteDriver { driver_id } => json!({ "driver_id": driver_id }),
            AdminAction::BlockUser { kind, id } | AdminAction::UnblockUser { kind, id } => {
                json!({ "user_type": kind.as_str(), "user_id": id })
            }
            // The target id travels in the path for these two.
            AdminAction::ResolveFeedback { .. } => json!({}),
            AdminAction::ResolveTicket { response, .. } => {
                json!({ "admin_response": response })
            }
            AdminAction::SaveSettings(settings) => settings.clone(),
            AdminAction::SaveCommissionRates(rates) => {
                json!({ "bajaj_rate": rates.bajaj_rate, "car_rate": rates.car_rate })
            }
            AdminAction::AddAdmin { username, password } => {
                json!({ "username": username, "password": password })
            }
            AdminAction::DeleteAdmin { admin_id } => json!({ "admin_id": admin_id }),
            AdminAction::ChangePassword { current, new, .. } => {
                json!({ "current_password": current, "new_password": new })
            }
            AdminAction::CalculateEarnings { month } => json!({ "month": month }),
            AdminAction::AddDriver(_)
            | AdminAction::UpdateDriver { .. }
            | AdminAction::UpdateProfile(_) => Value::Null,
        }
    }

    /// Multipart body for the form-based actions.
    async fn form(&self) -> Result<Form> {
        match self {
            AdminAction::AddDriver(form) | AdminAction::UpdateDriver { form, .. } => {
                driver_form(form).await
            }
            AdminAction::UpdateProfile(profile) => {
                let mut parts = Form::new().text("username", profile.username.clone());
                if let Some(path) = &profile.photo_path {
                    parts = parts.part("photo", file_part(path).await?);
                }
                Ok(parts)
            }
            _ => Err(RideopsError::Other(
                "action does not carry a multipart body".to_string(),
            )),
        }
    }

    /// Feedback line shown when the backend accepts the action.
    pub fn success_message(&self) -> &'static str {
        match self.kind() {
            ActionKind::AssignRide => "Driver assigned successfully!",
            ActionKind::SetDriverStatus => "Driver status updated",
            ActionKind::CompleteRide => "Ride marked as completed",
            ActionKind::CancelRide => "Ride canceled",
            ActionKind::AddDriver => "Driver added successfully!",
            ActionKind::UpdateDriver => "Driver updated",
            ActionKind::DeleteDriver => "Driver deleted",
            ActionKind::BlockUser => "User blocked",
            ActionKind::UnblockUser => "User unblocked",
            ActionKind::ResolveFeedback => "Feedback marked as resolved",
            ActionKind::ResolveTicket => "Ticket resolved",
            ActionKind::SaveSettings => "Settings saved",
            ActionKind::SaveCommissionRates => "Commission rates saved",
            ActionKind::AddAdmin => "Admin account created",
            ActionKind::DeleteAdmin => "Admin account deleted",
            ActionKind::UpdateProfile => "Profile updated",
            ActionKind::ChangePassword => "Password changed",
            ActionKind::CalculateEarnings => "Earnings recalculated",
        }
    }
}

async fn file_part(path: &PathBuf) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(RideopsError::Io)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}

async fn driver_form(form: &DriverForm) -> Result<Form> {
    let mut parts = Form::new()
        .text("name", form.name.clone())
        .text("phone_number", form.phone_number.clone());
    if let Some(vehicle) = form.vehicle_type {
        parts = parts.text("vehicle_type", vehicle.to_string());
    }
    if let Some(password) = &form.password {
        parts = parts.text("password", password.clone());
    }
    if let Some(path) = &form.photo_path {
        parts = parts.part("photo", file_part(path).await?);
    }
    Ok(parts)
}

/// Run one validated action against the backend.
pub async fn execute(gateway: &Gateway, action: &AdminAction) -> Result<WriteOutcome> {
    action.validate()?;
    let route = action.route();
    let endpoint = action.endpoint();

    let outcome = match route.body {
        BodyKind::Json => {
            gateway
                .write(&endpoint, &action.payload(), route.method.clone())
                .await
        }
        BodyKind::Multipart => {
            let form = action.form().await?;
            gateway.write_multipart(&endpoint, form).await
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_kind_has_a_route() {
        let actions = [
            ActionKind::AssignRide,
            ActionKind::SetDriverStatus,
            ActionKind::CompleteRide,
            ActionKind::CancelRide,
            ActionKind::AddDriver,
            ActionKind::UpdateDriver,
            ActionKind::DeleteDriver,
            ActionKind::BlockUser,
            ActionKind::UnblockUser,
            ActionKind::ResolveFeedback,
            ActionKind::ResolveTicket,
            ActionKind::SaveSettings,
            ActionKind::SaveCommissionRates,
            ActionKind::AddAdmin,
            ActionKind::DeleteAdmin,
            ActionKind::UpdateProfile,
            ActionKind::ChangePassword,
            ActionKind::CalculateEarnings,
        ];
        for kind in actions {
            assert!(ROUTES.contains_key(&kind), "missing route for {kind:?}");
        }
    }

    #[test]
    fn test_routes_use_backend_paths() {
        assert_eq!(ROUTES[&ActionKind::BlockUser].endpoint, "users/block");
        assert_eq!(ROUTES[&ActionKind::UnblockUser].endpoint, "users/unblock");
        assert_eq!(ROUTES[&ActionKind::AddAdmin].endpoint, "admins/add");
        assert_eq!(ROUTES[&ActionKind::DeleteAdmin].endpoint, "admins/delete");
        assert_eq!(
            ROUTES[&ActionKind::UpdateProfile].endpoint,
            "admins/update-profile"
        );
        assert_eq!(
            ROUTES[&ActionKind::ChangePassword].endpoint,
            "admins/change-password"
        );
        assert_eq!(ROUTES[&ActionKind::SaveSettings].method, Method::POST);
        assert_eq!(
            ROUTES[&ActionKind::SaveCommissionRates].method,
            Method::POST
        );
    }

    #[test]
    fn test_id_routes_substitute_the_path_segment() {
        let action = AdminAction::UpdateDriver {
            driver_id: 12,
            form: DriverForm::default(),
        };
        assert_eq!(action.endpoint(), "update-driver/12");

        let action = AdminAction::ResolveFeedback { feedback_id: 9 };
        assert_eq!(action.endpoint(), "feedback/resolve/9");
        // Nothing but the path carries the id.
        assert_eq!(action.payload(), json!({}));

        let action = AdminAction::ResolveTicket {
            ticket_id: 4,
            response: Some("done".to_string()),
        };
        assert_eq!(action.endpoint(), "support-tickets/4/resolve");
        assert!(action.payload().get("ticket_id").is_none());
    }

    #[test]
    fn test_assign_requires_selected_driver() {
        let action = AdminAction::AssignRide {
            ride_id: 7,
            driver_id: None,
        };
        let err = action.validate().unwrap_err();
        assert!(matches!(err, RideopsError::Validation(_)));

        let action = AdminAction::AssignRide {
            ride_id: 7,
            driver_id: Some(3),
        };
        assert!(action.validate().is_ok());
        assert_eq!(action.route().endpoint, "assign-ride");
        assert_eq!(action.payload(), json!({ "ride_id": 7, "driver_id": 3 }));
    }

    #[test]
    fn test_password_rules() {
        let action = AdminAction::ChangePassword {
            current: "old-secret".to_string(),
            new: "short".to_string(),
            confirm: "short".to_string(),
        };
        assert!(action.validate().is_err());

        let action = AdminAction::ChangePassword {
            current: "old-secret".to_string(),
            new: "new-secret".to_string(),
            confirm: "different".to_string(),
        };
        assert!(action.validate().is_err());

        let action = AdminAction::ChangePassword {
            current: "old-secret".to_string(),
            new: "new-secret".to_string(),
            confirm: "new-secret".to_string(),
        };
        assert!(action.validate().is_ok());
        // The confirmation never leaves the client.
        let payload = action.payload();
        assert!(payload.get("confirm").is_none());
        assert_eq!(payload["new_password"], "new-secret");
    }

    #[test]
    fn test_multipart_actions_are_marked() {
        let form_action = AdminAction::AddDriver(DriverForm::default());
        assert_eq!(form_action.route().body, BodyKind::Multipart);

        let json_action = AdminAction::CompleteRide { ride_id: 1 };
        assert_eq!(json_action.route().body, BodyKind::Json);
    }

    #[test]
    fn test_status_payload_uses_wire_labels() {
        let action = AdminAction::SetDriverStatus {
            driver_id: 4,
            status: DriverStatus::OnTrip,
        };
        assert_eq!(action.payload()["status"], "On Trip");
    }

    #[test]
    fn test_add_driver_validation() {
        let mut form = DriverForm {
            name: "Abel".to_string(),
            phone_number: "+251911000000".to_string(),
            vehicle_type: Some(VehicleType::Bajaj),
            password: Some("secret1".to_string()),
            photo_path: None,
        };
        assert!(AdminAction::AddDriver(form.clone()).validate().is_ok());

        form.password = None;
        assert!(AdminAction::AddDriver(form.clone()).validate().is_err());

        form.password = Some("secret1".to_string());
        form.name = "  ".to_string();
        assert!(AdminAction::AddDriver(form).validate().is_err());
    }
}
