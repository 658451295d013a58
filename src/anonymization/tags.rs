//! Fixed field tables
//!
//! Identity fields read by the resolver, the replace-table and the
//! delete-list applied by the scrubber. None of these are read from
//! configuration.

use crate::domain::record::Field;
use dicom::core::VR;

/// Patient's name, rewritten to the pseudonym
pub const PATIENT_NAME: Field = Field::new("PatientName", 0x0010, 0x0010, VR::PN);
/// Real patient identifier, the ledger key
pub const PATIENT_ID: Field = Field::new("PatientID", 0x0010, 0x0020, VR::LO);
/// Accession number of the study
pub const ACCESSION_NUMBER: Field = Field::new("AccessionNumber", 0x0008, 0x0050, VR::SH);
/// Study date, `YYYYMMDD`
pub const STUDY_DATE: Field = Field::new("StudyDate", 0x0008, 0x0020, VR::DA);

/// Fields forced to a fixed value, inserted when absent
pub const REPLACE_TABLE: [(Field, &str); 4] = [
    (Field::new("PatientBirthDate", 0x0010, 0x0030, VR::DA), "00010101"),
    (PATIENT_ID, "anonymised"),
    (Field::new("PatientAddress", 0x0010, 0x1040, VR::LO), "anonymised"),
    (Field::new("ReferringPhysicianName", 0x0008, 0x0090, VR::PN), "anonymised"),
];

/// Fields removed when present
pub const DELETE_LIST: [Field; 23] = [
    Field::new("OtherPatientIDs", 0x0010, 0x1000, VR::LO),
    Field::new("OtherPatientNames", 0x0010, 0x1001, VR::PN),
    Field::new("OtherPatientIDsSequence", 0x0010, 0x1002, VR::SQ),
    Field::new("IssuerOfPatientID", 0x0010, 0x0021, VR::LO),
    Field::new("InstitutionName", 0x0008, 0x0080, VR::LO),
    Field::new("InstitutionAddress", 0x0008, 0x0081, VR::ST),
    Field::new("PerformingPhysicianName", 0x0008, 0x1050, VR::PN),
    Field::new("PerformingPhysicianIdentificationSequence", 0x0008, 0x1052, VR::SQ),
    Field::new("OperatorsName", 0x0008, 0x1070, VR::PN),
    Field::new("OperatorIdentificationSequence", 0x0008, 0x1072, VR::SQ),
    Field::new("IssuerOfPatientIDQualifiersSequence", 0x0010, 0x0024, VR::SQ),
    Field::new("ReferencedPatientPhotoSequence", 0x0010, 0x1100, VR::SQ),
    Field::new("ResponsiblePerson", 0x0010, 0x2297, VR::PN),
    Field::new("ResponsiblePersonRole", 0x0010, 0x2298, VR::CS),
    Field::new("ResponsibleOrganization", 0x0010, 0x2299, VR::LO),
    Field::new("ReferringPhysicianIdentificationSequence", 0x0008, 0x0096, VR::SQ),
    Field::new("ConsultingPhysicianIdentificationSequence", 0x0008, 0x009D, VR::SQ),
    Field::new("PhysiciansOfRecord", 0x0008, 0x1048, VR::PN),
    Field::new("PhysiciansOfRecordIdentificationSequence", 0x0008, 0x1049, VR::SQ),
    Field::new("NameOfPhysiciansReadingStudy", 0x0008, 0x1060, VR::PN),
    Field::new("PhysiciansReadingStudyIdentificationSequence", 0x0008, 0x1062, VR::SQ),
    Field::new("PatientComments", 0x0010, 0x4000, VR::LT),
    Field::new("InstitutionalDepartmentName", 0x0008, 0x1040, VR::LO),
];
