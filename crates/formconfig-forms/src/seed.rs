//! The built-in configuration used when no seed file is supplied.

use crate::schema::{Field, FieldType, FormConfiguration, FormType};

/// Returns the built-in residential / commercial inquiry configuration,
/// normalized and with fresh ids.
pub fn default_configuration() -> FormConfiguration {
    let mut config = FormConfiguration::new(
        "Get a Free Quote",
        "Tell us about your project and we will get back to you within one business day.",
    );
    config.form_types = vec![residential(), commercial()];
    config.normalize();
    config
}

fn residential() -> FormType {
    FormType::new("residential", "Residential")
        .description("Homeowners and residential properties")
        .success_message("Thank you! We will contact you shortly about your home project.")
        .field(
            Field::new("name", "Full Name", FieldType::Text)
                .required(true)
                .placeholder("Jane Doe")
                .max_length(100),
        )
        .field(
            Field::new("email", "Email", FieldType::Email)
                .required(true)
                .placeholder("jane@example.com")
                .pattern(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
        )
        .field(
            Field::new("phone", "Phone", FieldType::Tel)
                .required(true)
                .placeholder("5551234567")
                .help_text("10 digits, no spaces")
                .min_length(10)
                .max_length(10),
        )
        .field(Field::new("address", "Property Address", FieldType::Text).max_length(200))
        .field(
            Field::new("propertyType", "Property Type", FieldType::Select)
                .required(true)
                .option("Single-family home", "single-family")
                .option("Townhouse", "townhouse")
                .option("Condo", "condo"),
        )
        .field(
            Field::new("message", "Project Details", FieldType::Textarea)
                .placeholder("What would you like done?")
                .max_length(2000),
        )
        .field(
            Field::new("contactMethod", "Preferred Contact Method", FieldType::Radio)
                .option("Email", "email")
                .option("Phone", "phone"),
        )
        .field(Field::new(
            "newsletter",
            "Send me seasonal maintenance tips",
            FieldType::Checkbox,
        ))
}

fn commercial() -> FormType {
    FormType::new("commercial", "Commercial")
        .description("Businesses, offices and multi-unit properties")
        .success_message("Thank you! A commercial project manager will reach out within 24 hours.")
        .field(
            Field::new("companyName", "Company Name", FieldType::Text)
                .required(true)
                .max_length(150),
        )
        .field(
            Field::new("contactName", "Contact Name", FieldType::Text)
                .required(true)
                .max_length(100),
        )
        .field(
            Field::new("email", "Email", FieldType::Email)
                .required(true)
                .pattern(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
        )
        .field(
            Field::new("phone", "Phone", FieldType::Tel)
                .required(true)
                .min_length(10)
                .max_length(10),
        )
        .field(
            Field::new("employees", "Number of Employees", FieldType::Number)
                .min(1.0)
                .max(100_000.0),
        )
        .field(
            Field::new("services", "Services Needed", FieldType::Checkbox)
                .option("Roofing", "roofing")
                .option("Solar", "solar")
                .option("HVAC", "hvac")
                .option("Maintenance contract", "maintenance"),
        )
}
