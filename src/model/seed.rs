//! The sample expenses a new data home starts with (September 2025).

use crate::model::{Amount, ExpenseRecord, DEFAULT_DETAIL};

/// `(date, event, food, fuel, other)`
const SEED: [(&str, &str, i64, i64, i64); 10] = [
    ("2025-09-02", "Pedro Strop Acad @ Juan Uribe Acad (Don Gregorio)", 500, 1115, 200),
    ("2025-09-03", "Mickeys @ Javier Academy (Yamasá)", 500, 1010, 800),
    ("2025-09-04", "Fausto Cuevas @ TBA Academy (Palenque)", 500, 950, 200),
    ("2025-09-05", "Acevedo Acad @ Enrique Soto Acad (La victoria)", 500, 700, 200),
    ("2025-09-09", "Pedro Strop Acad @ Juan Uribe Acad (Don Gregorio)", 500, 1115, 200),
    ("2025-09-10", "AMC @ Enrique Soto (Yaguate) / Partido suspendido en terreno", 0, 720, 200),
    ("2025-09-10", "Mariners Selection @ Mickeys (Complejo Epy Guerrero)", 500, 560, 200),
    ("2025-09-16", "Fausto Cuevas @ Papon Academy (Loma del sueño)", 500, 800, 200),
    ("2025-09-17", "David Academy @ Esteban German (Complejo JD Ozuna, BC)", 500, 1200, 400),
    ("2025-09-23", "Pedro Strop Acad @ Juan Uribe Acad (Don Gregorio)", 500, 1115, 200),
];

/// Returns the ten seed expenses. Their ids, `seed-01` to `seed-10`, are fixed so that repeated
/// loads of an empty store agree with each other.
pub fn seed_records() -> Vec<ExpenseRecord> {
    SEED.iter()
        .enumerate()
        .map(|(ix, (date, event, food, fuel, other))| {
            ExpenseRecord::new(
                format!("seed-{:02}", ix + 1),
                *date,
                *event,
                DEFAULT_DETAIL,
                Amount::from_pesos(*food),
                Amount::from_pesos(*fuel),
                Amount::from_pesos(*other),
            )
        })
        .collect()
}
