// Curated snapshot of Rio de Janeiro state works, used whenever no live
// source can be read. Values are fixed so reports built from it are
// reproducible.
use crate::types::{ProjectRecord, ProjectStatus, WorkType};
use chrono::NaiveDate;
use once_cell::sync::Lazy;

static DATASET: Lazy<Vec<ProjectRecord>> = Lazy::new(build);

pub fn dataset() -> &'static [ProjectRecord] {
    &DATASET
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("fallback dataset dates are valid calendar dates")
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    name: &str,
    municipality: &str,
    work_type: WorkType,
    agency: &str,
    status: ProjectStatus,
    built_area_m2: f64,
    (contracted_value, paid_amount): (f64, f64),
    (planned_start, planned_end): (NaiveDate, NaiveDate),
    (actual_start, actual_end): (NaiveDate, Option<NaiveDate>),
    (physical_pct, financial_pct): (f64, f64),
    (amendments, stoppages, recurrence): (u32, u32, bool),
) -> ProjectRecord {
    ProjectRecord {
        id: id.to_string(),
        name: name.to_string(),
        municipality: municipality.to_string(),
        work_type,
        agency: agency.to_string(),
        status,
        built_area_m2,
        contracted_value,
        paid_amount,
        planned_start,
        planned_end,
        actual_start,
        actual_end,
        physical_pct,
        financial_pct,
        amendments,
        stoppages,
        recurrence,
    }
}

fn build() -> Vec<ProjectRecord> {
    use ProjectStatus::*;
    use WorkType::*;

    vec![
        record(
            "RJ-2023-001",
            "Escola Estadual Professor Darcy Ribeiro",
            "Niterói",
            Building,
            "SEEDUC",
            Completed,
            2_400.0,
            (8_100_000.0, 7_900_000.0),
            (ymd(2023, 2, 1), ymd(2023, 11, 30)),
            (ymd(2023, 2, 15), Some(ymd(2023, 12, 20))),
            (100.0, 100.0),
            (1, 0, false),
        ),
        record(
            "RJ-2022-014",
            "Rede coletora de esgoto Jardim Catarina",
            "São Gonçalo",
            Sanitation,
            "CEDAE",
            InProgress,
            6_500.0,
            (31_000_000.0, 21_500_000.0),
            (ymd(2022, 6, 1), ymd(2023, 12, 31)),
            (ymd(2022, 8, 10), None),
            (58.0, 69.0),
            (3, 1, false),
        ),
        record(
            "RJ-2023-027",
            "Pavimentação da Estrada do Contorno",
            "Duque de Caxias",
            Paving,
            "DER-RJ",
            Completed,
            42_000.0,
            (17_800_000.0, 18_600_000.0),
            (ymd(2023, 3, 1), ymd(2023, 9, 30)),
            (ymd(2023, 3, 20), Some(ymd(2023, 11, 15))),
            (100.0, 100.0),
            (2, 0, true),
        ),
        record(
            "RJ-2021-033",
            "Canal de drenagem do Rio Sarapuí",
            "Belford Roxo",
            Drainage,
            "INEA",
            Stalled,
            9_800.0,
            (26_400_000.0, 19_900_000.0),
            (ymd(2021, 5, 1), ymd(2022, 10, 31)),
            (ymd(2021, 7, 1), None),
            (44.0, 75.0),
            (4, 3, true),
        ),
        record(
            "RJ-2022-041",
            "Viaduto de acesso ao Arco Metropolitano",
            "Itaguaí",
            BridgeViaduct,
            "DER-RJ",
            Completed,
            3_100.0,
            (39_500_000.0, 38_200_000.0),
            (ymd(2022, 1, 10), ymd(2023, 6, 30)),
            (ymd(2022, 2, 1), Some(ymd(2023, 8, 15))),
            (100.0, 100.0),
            (1, 0, false),
        ),
        record(
            "RJ-2023-052",
            "Reforma do Hospital Estadual Adão Pereira Nunes",
            "Duque de Caxias",
            Renovation,
            "SES-RJ",
            InProgress,
            5_200.0,
            (13_900_000.0, 9_100_000.0),
            (ymd(2023, 4, 1), ymd(2024, 3, 31)),
            (ymd(2023, 5, 2), None),
            (61.0, 65.0),
            (2, 0, false),
        ),
        record(
            "RJ-2022-066",
            "Contenção de encostas no Morro da Oficina",
            "Petrópolis",
            SlopeContainment,
            "DRM-RJ",
            Completed,
            4_000.0,
            (16_300_000.0, 17_200_000.0),
            (ymd(2022, 3, 15), ymd(2022, 12, 15)),
            (ymd(2022, 3, 20), Some(ymd(2023, 2, 28))),
            (100.0, 100.0),
            (2, 1, true),
        ),
        record(
            "RJ-2023-071",
            "Centro de Referência da Juventude",
            "Campos dos Goytacazes",
            PublicFacility,
            "SEASDH",
            NotStarted,
            1_300.0,
            (3_600_000.0, 0.0),
            (ymd(2024, 2, 1), ymd(2024, 12, 20)),
            (ymd(2024, 2, 1), None),
            (0.0, 0.0),
            (0, 0, false),
        ),
        record(
            "RJ-2021-085",
            "Reforma da Biblioteca Parque Estadual",
            "Rio de Janeiro",
            Renovation,
            "SECEC",
            Cancelled,
            3_700.0,
            (9_200_000.0, 2_300_000.0),
            (ymd(2021, 8, 1), ymd(2022, 7, 31)),
            (ymd(2021, 9, 15), Some(ymd(2022, 4, 30))),
            (18.0, 25.0),
            (1, 2, false),
        ),
        record(
            "RJ-2022-090",
            "Galerias pluviais da Avenida Brasil",
            "Rio de Janeiro",
            Drainage,
            "SEINFRA",
            Completed,
            7_600.0,
            (14_100_000.0, 13_800_000.0),
            (ymd(2022, 4, 1), ymd(2023, 1, 31)),
            (ymd(2022, 4, 1), Some(ymd(2023, 2, 10))),
            (100.0, 98.0),
            (0, 0, false),
        ),
    ]
}
