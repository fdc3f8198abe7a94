use tracing::warn;

use super::types::{AuthContext, Role};
use crate::ids::EntityId;
use crate::progress::PatientModel;
use crate::shared::AppError;

/// Patients may only see themselves; therapists only their own patients.
pub fn ensure_patient_access(auth: &AuthContext, patient: &PatientModel) -> Result<(), AppError> {
    let allowed = match auth.role {
        Role::Paciente => auth.user_id == patient.id,
        Role::Fono => auth.user_id == patient.fono_id,
    };

    if !allowed {
        warn!(
            user_id = %auth.user_id,
            role = %auth.role,
            patient_id = %patient.id,
            "Caller may not access this patient"
        );
        return Err(AppError::Forbidden(format!(
            "no access to patient {}",
            patient.id
        )));
    }
    Ok(())
}

/// Returns the therapist id, or `Forbidden` for any other role
pub fn require_fono(auth: &AuthContext) -> Result<EntityId, AppError> {
    match auth.role {
        Role::Fono => Ok(auth.user_id),
        Role::Paciente => Err(AppError::Forbidden(
            "only therapists may use this endpoint".to_string(),
        )),
    }
}
