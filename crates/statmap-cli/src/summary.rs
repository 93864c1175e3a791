use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use statmap_cli::types::ReconcileOutput;
use statmap_map::{MappingReview, PartitionedMappings, StoredMappingMetadata, UpdatedEntry};
use statmap_model::{DataSetVersionMapping, MappingType};

pub fn print_created(mapping: &DataSetVersionMapping) {
    println!(
        "Mapping: {} -> {}",
        mapping.source_version_id, mapping.target_version_id
    );
    let mut counts = [0usize; 4];
    for mapping_type in mapping.mapping_types() {
        counts[type_index(mapping_type)] += 1;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Type"), header_cell("Entries")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for mapping_type in [
        MappingType::AutoMapped,
        MappingType::AutoNone,
        MappingType::ManualMapped,
        MappingType::ManualNone,
    ] {
        table.add_row(vec![
            type_cell(mapping_type),
            Cell::new(counts[type_index(mapping_type)]),
        ]);
    }
    println!("{table}");
    print_version_bump(mapping.is_major_version_update());
}

pub fn print_entry(entry: &UpdatedEntry) {
    let kind = entry.kind();
    println!(
        "{} ({}): {}{}",
        entry.source_key(),
        entry.public_id(),
        kind.mapping_type(),
        kind.candidate_key()
            .map(|key| format!(" -> {key}"))
            .unwrap_or_default()
    );
}

pub fn print_review(review: &MappingReview) {
    println!(
        "Mapping: {} -> {}",
        review.source_version_id, review.target_version_id
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Auto-mapped"),
        header_cell("Needs review / manual"),
        header_cell("Unmapped"),
        header_cell("New candidates"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (level, partitioned) in &review.locations {
        table.add_row(group_row(
            format!("Locations: {}", level.plural_label()),
            partitioned,
            partitioned.is_live(),
        ));
    }
    for filter in review.filters.values() {
        table.add_row(group_row(
            format!("Filter: {}", filter.label()),
            &filter.options,
            filter.is_live(),
        ));
    }
    table.add_row(group_row(
        "Indicators".to_string(),
        &review.indicators,
        review.indicators.is_live(),
    ));
    println!("{table}");

    if !review.new_filters.is_empty() {
        let labels: Vec<&str> = review
            .new_filters
            .iter()
            .map(|filter| filter.label.as_str())
            .collect();
        println!("New filters: {}", labels.join(", "));
    }

    let errors: Vec<_> = review.errors().collect();
    if !errors.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Id"), header_cell("Message")]);
        apply_table_style(&mut table);
        for error in errors {
            table.add_row(vec![
                Cell::new(&error.id).fg(Color::Blue),
                Cell::new(&error.message).fg(Color::Yellow),
            ]);
        }
        println!();
        println!("Unmapped:");
        println!("{table}");
    }

    println!();
    println!(
        "Locations: {}  Filters: {}  Indicators: {}",
        completeness(review.locations_complete()),
        completeness(review.filters_complete()),
        completeness(review.indicators_complete()),
    );
    print_version_bump(review.is_major_version_update);
}

pub fn print_list(records: &[StoredMappingMetadata]) {
    if records.is_empty() {
        println!("No mappings stored.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Target version"),
        header_cell("Source version"),
        header_cell("Entries"),
        header_cell("Unmapped"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.target_version_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&record.source_version_id),
            Cell::new(record.entry_count),
            count_cell(record.unmapped_count, Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn print_reconcile(output: &ReconcileOutput) {
    match output {
        ReconcileOutput::Flat(ids) => println!("{}", ids.join(",")),
        ReconcileOutput::Slices(slices) => {
            let mut table = Table::new();
            table.set_header(vec![header_cell("Selected"), header_cell("Expanded")]);
            apply_table_style(&mut table);
            for (selected, expanded) in slices {
                table.add_row(vec![
                    Cell::new(selected).add_attribute(Attribute::Bold),
                    Cell::new(expanded.join(" > ")),
                ]);
            }
            println!("{table}");
        }
    }
}

fn group_row<S, C>(
    label: String,
    partitioned: &PartitionedMappings<S, C>,
    live: bool,
) -> Vec<Cell> {
    let label_cell = if live {
        Cell::new(label)
    } else {
        dim_cell(format!("{label} (removed)"))
    };
    vec![
        label_cell,
        Cell::new(partitioned.auto_mapped.len()),
        Cell::new(partitioned.unmapped_and_manual.len()),
        count_cell(partitioned.unmapped_count(), Color::Yellow),
        count_cell(partitioned.new_candidates.len(), Color::Green),
    ]
}

fn print_version_bump(major: bool) {
    if major {
        println!("Version update: major (something has no replacement)");
    } else {
        println!("Version update: minor");
    }
}

fn completeness(complete: bool) -> &'static str {
    if complete { "complete" } else { "needs review" }
}

fn type_index(mapping_type: MappingType) -> usize {
    match mapping_type {
        MappingType::AutoMapped => 0,
        MappingType::AutoNone => 1,
        MappingType::ManualMapped => 2,
        MappingType::ManualNone => 3,
    }
}

fn type_cell(mapping_type: MappingType) -> Cell {
    let cell = Cell::new(mapping_type);
    match mapping_type {
        MappingType::AutoMapped | MappingType::ManualMapped => cell.fg(Color::Green),
        MappingType::AutoNone => cell.fg(Color::Yellow).add_attribute(Attribute::Bold),
        MappingType::ManualNone => cell.fg(Color::Red),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
