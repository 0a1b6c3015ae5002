use crate::classification::EmployeeProfile;
use crate::timesheet_data::{Bond, Employee, Role, TemplateVariant};

/// Roles printed on the V2 layout when the bond is Efetivo.
const V2_EFETIVO_ROLES: [Role; 5] = [
    Role::Professor,
    Role::AssistenteSocial,
    Role::Psicologo,
    Role::Gestor,
    Role::Supervisor,
];

/// Pick the PDF layout for an employee. First match wins.
pub fn select(employee: &Employee) -> TemplateVariant {
    select_for_profile(&EmployeeProfile::new(employee))
}

/// Same as [`select`], for an already classified employee.
pub fn select_for_profile(profile: &EmployeeProfile<'_>) -> TemplateVariant {
    let role = profile.role();
    let bond = profile.bond();

    if profile.is_teacher_in_management() {
        TemplateVariant::V2
    } else if profile.is_volunteer_20h() {
        TemplateVariant::V6
    } else if profile.is_fundamental_ii_teacher() {
        TemplateVariant::V5
    } else if profile.is_volunteer() {
        TemplateVariant::V4
    } else if profile.uses_contract_layout() {
        TemplateVariant::V3
    } else if role == Role::Professor && bond == Bond::Contrato {
        TemplateVariant::V2
    } else if V2_EFETIVO_ROLES.contains(&role) && bond == Bond::Efetivo {
        TemplateVariant::V2
    } else {
        TemplateVariant::V1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn employee(role: Role, bond: Bond, function: &str) -> Employee {
        Employee {
            id: "e1".to_string(),
            account_id: "acc".to_string(),
            name: "Teste".to_string(),
            registration_number: None,
            role,
            bond,
            job_function: function.to_string(),
            work_days: Vec::new(),
            shift: Vec::new(),
            school_name: None,
            discipline: None,
            weekly_hours: None,
        }
    }

    const FUNCTIONS: [&str; 9] = [
        "",
        "Vigia",
        "Vigia 12h x 36h",
        "ASG",
        "Psicóloga",
        "Merendeira",
        "Supervisora",
        "Gestor(a) escolar",
        "Docente",
    ];

    #[test]
    fn test_selection_is_total_and_deterministic() {
        let mut seen = std::collections::HashSet::new();
        for role in Role::iter() {
            for bond in Bond::iter() {
                for function in FUNCTIONS {
                    let e = employee(role, bond, function);
                    let variant = select(&e);
                    assert_eq!(variant, select(&e));
                    seen.insert(variant);
                }
            }
        }
        assert_eq!(seen.len(), TemplateVariant::iter().count());
    }

    #[test]
    fn test_teacher_in_management_beats_volunteer_20h() {
        let e = employee(Role::Professor, Bond::EducadorVoluntario20h, "Gestora");
        assert_eq!(select(&e), TemplateVariant::V2);
        let e = employee(Role::Professor, Bond::EducadorVoluntario20h, "Docente");
        assert_eq!(select(&e), TemplateVariant::V6);
    }

    #[test]
    fn test_fundamental_ii() {
        for bond in [Bond::PrestadorServicos, Bond::Contrato, Bond::Efetivo] {
            assert_eq!(select(&employee(Role::ProfessorFundamentalII, bond, "Português")), TemplateVariant::V5);
        }
        assert_eq!(
            select(&employee(Role::ProfessorFundamentalII, Bond::Terceirizado, "Português")),
            TemplateVariant::V1
        );
    }

    #[test]
    fn test_volunteer_v4() {
        assert_eq!(select(&employee(Role::Asg, Bond::EducadorVoluntario, "ASG")), TemplateVariant::V4);
    }

    #[test]
    fn test_contract_service_v3() {
        assert_eq!(select(&employee(Role::Vigia, Bond::Contrato, "Vigia 12h x 36h")), TemplateVariant::V3);
        assert_eq!(select(&employee(Role::Vigia, Bond::Contrato, "Porteiro")), TemplateVariant::V1);
        assert_eq!(select(&employee(Role::Secretario, Bond::Contrato, "asg")), TemplateVariant::V3);
        assert_eq!(select(&employee(Role::Nutricionista, Bond::Contrato, "")), TemplateVariant::V3);
        assert_eq!(select(&employee(Role::Psicologo, Bond::Contrato, "PSICÓLOGA")), TemplateVariant::V3);
        assert_eq!(select(&employee(Role::Psicologo, Bond::Contrato, "Psicólogo")), TemplateVariant::V1);
        assert_eq!(select(&employee(Role::Merendeira, Bond::Contrato, "Merendeira")), TemplateVariant::V3);
        assert_eq!(select(&employee(Role::Supervisor, Bond::Contrato, "Supervisora")), TemplateVariant::V3);
    }

    #[test]
    fn test_v2_and_default() {
        assert_eq!(select(&employee(Role::Professor, Bond::Contrato, "Docente")), TemplateVariant::V2);
        assert_eq!(select(&employee(Role::AssistenteSocial, Bond::Efetivo, "")), TemplateVariant::V2);
        assert_eq!(select(&employee(Role::Supervisor, Bond::Efetivo, "")), TemplateVariant::V2);
        assert_eq!(select(&employee(Role::Gestor, Bond::Contrato, "")), TemplateVariant::V1);
        assert_eq!(select(&employee(Role::Asg, Bond::Efetivo, "ASG")), TemplateVariant::V1);
    }
}
