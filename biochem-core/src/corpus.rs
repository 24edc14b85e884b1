//! # Demonstration Sentences
//!
//! Short lecture-style sentences exercising every pass: ions, table
//! formulas, acronyms, units, exponents and amino-acid codes. Used by the web
//! front as ready-made inputs and by the tests as end-to-end fixtures.

/// (topic, sentence) pairs.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Cofactors", "The reaction requires ATP and Mg2+ ions at pH 7.4."),
        ("Ions", "Ca2+ activates the enzyme, while H2O acts as a substrate."),
        ("Concentrations", "The concentration of NADH was 5 mM in the solution."),
        (
            "Nucleic acids",
            "DNA polymerase synthesizes RNA from nucleotides like ATP, GTP, CTP, and UTP.",
        ),
        ("Kinetics", "The Km value for this enzyme is 10^-7 M."),
        ("Redox", "Fe2+ can be oxidized to Fe3+ in the presence of O2."),
        ("Amino acids", "The protein contains Cys, Met, and His residues."),
    ]
}
