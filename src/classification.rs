//! Employee classification shared by template selection and day annotation.
//!
//! Role and bond are categorical, but part of the disambiguation depends on
//! the free-text Função. That text is normalized (diacritics stripped,
//! lowercased, trimmed) and matched by substring against known fragments.
//! All such matching lives here.

use unicode_normalization::UnicodeNormalization;

use crate::timesheet_data::{Bond, Employee, Role};

const VIGIA: &str = "vigia";
const ASG: &str = "asg";
const PSICOLOGA: &str = "psicologa";
const MERENDEIRA: &str = "merendeira";
const SUPERVISORA: &str = "supervisora";
const GESTOR: &str = "gestor";
const SHIFT_12X36: &str = "12h x 36h";

/// NFD-decompose, drop combining marks (U+0300..U+036F), lowercase, trim.
pub fn normalize_text(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Normalized Função. Construction is the only way to get one, so raw
/// comparisons against the unnormalized text cannot slip in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFunction(String);

impl JobFunction {
    /// Normalise the raw Função text once.
    pub fn new(raw: &str) -> Self {
        Self(normalize_text(raw))
    }

    fn mentions(&self, fragment: &str) -> bool {
        self.0.contains(fragment)
    }

    pub fn is_vigia_function(&self) -> bool {
        self.mentions(VIGIA)
    }

    pub fn is_asg_function(&self) -> bool {
        self.mentions(ASG)
    }

    pub fn is_psicologa_function(&self) -> bool {
        self.mentions(PSICOLOGA)
    }

    pub fn is_merendeira_function(&self) -> bool {
        self.mentions(MERENDEIRA)
    }

    pub fn is_supervisora_function(&self) -> bool {
        self.mentions(SUPERVISORA)
    }

    pub fn is_gestor_function(&self) -> bool {
        self.mentions(GESTOR)
    }

    /// "12h x 36h" rotation
    pub fn is_12x36_function(&self) -> bool {
        self.mentions(SHIFT_12X36)
    }
}

/// Derived predicates for one employee, computed once and reused for every
/// day of the month and for template selection.
#[derive(Debug, Clone)]
pub struct EmployeeProfile<'a> {
    pub employee: &'a Employee,
    pub function: JobFunction,
}

impl<'a> EmployeeProfile<'a> {
    /// Wrap an employee and normalise its Função.
    pub fn new(employee: &'a Employee) -> Self {
        Self {
            employee,
            function: JobFunction::new(&employee.job_function),
        }
    }

    pub fn role(&self) -> Role {
        self.employee.role
    }

    pub fn bond(&self) -> Bond {
        self.employee.bond
    }

    fn is_contrato(&self) -> bool {
        self.bond() == Bond::Contrato
    }

    /// Educador Voluntário on the 20H bond.
    pub fn is_volunteer_20h(&self) -> bool {
        self.bond() == Bond::EducadorVoluntario20h
    }

    pub fn is_volunteer(&self) -> bool {
        self.bond() == Bond::EducadorVoluntario
    }

    /// Professor Fundamental II under Prestador(a) de Serviços, Contrato or Efetivo.
    pub fn is_fundamental_ii_teacher(&self) -> bool {
        self.role() == Role::ProfessorFundamentalII
            && matches!(self.bond(), Bond::PrestadorServicos | Bond::Contrato | Bond::Efetivo)
    }

    /// Professor whose Função names a gestor(a) post.
    pub fn is_teacher_in_management(&self) -> bool {
        self.role() == Role::Professor && self.function.is_gestor_function()
    }

    fn is_vigia_contrato(&self) -> bool {
        self.role() == Role::Vigia && self.is_contrato() && self.function.is_vigia_function()
    }

    /// Vigia on the 12x36 scale.
    pub fn is_vigia_12x36(&self) -> bool {
        self.is_vigia_contrato() && self.function.is_12x36_function()
    }

    pub fn is_generic_vigia_or_asg_contrato(&self) -> bool {
        (self.is_vigia_contrato() && !self.function.is_12x36_function())
            || (self.function.is_asg_function() && self.is_contrato())
    }

    fn is_other_contract_service(&self) -> bool {
        if !self.is_contrato() {
            return false;
        }
        match self.role() {
            Role::Psicologo => self.function.is_psicologa_function(),
            Role::Nutricionista => true,
            Role::Merendeira => self.function.is_merendeira_function(),
            Role::Supervisor => self.function.is_supervisora_function(),
            _ => false,
        }
    }

    /// Vigia, ASG and the other service roles on a Contrato bond.
    pub fn is_contract_service_group(&self) -> bool {
        self.is_generic_vigia_or_asg_contrato() || self.is_other_contract_service()
    }

    /// Any Vigia-or-ASG contract, 12x36 or not, plus the other contract
    /// service roles. This is the V3 layout population.
    pub fn uses_contract_layout(&self) -> bool {
        self.is_vigia_contrato()
            || (self.function.is_asg_function() && self.is_contrato())
            || self.is_other_contract_service()
    }
}
