use std::collections::HashSet;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/clinical_reference.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the catalog file before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let symptoms = required_array(catalog, "symptoms");
    let diagnoses = required_array(catalog, "diagnoses");

    let symptom_ids = validate_symptoms(symptoms);
    let total_links = validate_diagnoses(diagnoses, &symptom_ids);

    println!(
        "cargo:warning=Validated catalog: {} symptoms, {} diagnoses, {total_links} symptom links",
        symptoms.len(),
        diagnoses.len()
    );
}

fn required_array<'a>(catalog: &'a serde_json::Value, field: &str) -> &'a [serde_json::Value] {
    let value = catalog.get(field).unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing '{field}' field\n\
             The catalog must have a top-level '{field}' array.\n"
        );
    });

    value.as_array().map(Vec::as_slice).unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: '{field}' must be an array\n\
             Got: {value}\n"
        );
    })
}

fn validate_symptoms(symptoms: &[serde_json::Value]) -> HashSet<String> {
    let mut ids = HashSet::new();

    for (i, symptom) in symptoms.iter().enumerate() {
        let id = required_str(symptom, "id", "Symptom", i);
        required_str(symptom, "name", "Symptom", i);
        check_identifier(id, "Symptom", i);

        assert!(
            ids.insert(id.to_string()),
            "\n\nCATALOG BUILD ERROR: Duplicate symptom id '{id}' (index {i})\n"
        );
    }

    ids
}

fn validate_diagnoses(diagnoses: &[serde_json::Value], symptom_ids: &HashSet<String>) -> usize {
    let mut ids = HashSet::new();
    let mut total_links = 0;

    for (i, diagnosis) in diagnoses.iter().enumerate() {
        let id = required_str(diagnosis, "id", "Diagnosis", i);
        required_str(diagnosis, "code", "Diagnosis", i);
        required_str(diagnosis, "name", "Diagnosis", i);
        check_identifier(id, "Diagnosis", i);

        assert!(
            ids.insert(id.to_string()),
            "\n\nCATALOG BUILD ERROR: Duplicate diagnosis id '{id}' (index {i})\n"
        );

        let symptoms = diagnosis
            .get("symptoms")
            .and_then(serde_json::Value::as_array)
            .unwrap_or_else(|| {
                panic!(
                    "\n\nCATALOG BUILD ERROR: Diagnosis '{id}' (index {i}) missing 'symptoms' array\n"
                );
            });

        assert!(
            !symptoms.is_empty(),
            "\n\nCATALOG BUILD ERROR: Diagnosis '{id}' has no symptoms\n\
             A diagnosis without symptoms can never be matched.\n"
        );

        // The embedded catalog must be referentially clean
        for symptom in symptoms {
            let symptom_id = symptom.as_str().unwrap_or("<non-string>");
            assert!(
                symptom_ids.contains(symptom_id),
                "\n\nCATALOG BUILD ERROR: Diagnosis '{id}' references unknown symptom '{symptom_id}'\n"
            );
        }

        total_links += symptoms.len();
    }

    total_links
}

fn required_str<'a>(value: &'a serde_json::Value, field: &str, kind: &str, index: usize) -> &'a str {
    value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_else(|| {
            panic!("\n\nCATALOG BUILD ERROR: {kind} at index {index} missing '{field}' field\n");
        })
}

/// Ids must be typeable as CLI arguments: ASCII letters, digits, '-', '_' or '.'
fn check_identifier(id: &str, kind: &str, index: usize) {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    assert!(
        valid,
        "\n\nCATALOG BUILD ERROR: {kind} at index {index} has invalid id '{id}'\n\
         Use 1-64 ASCII letters, digits, '-', '_' or '.'.\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed=catalogs/clinical_reference.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
