// Integration tests for placement exports

use std::fs;
use stonepath_designer::rhinestone::export::ExportDocument;
use stonepath_designer::{
    calculate_hexagonal_grid, export_to_file, Bounds, ExportFormat, FillRegion, HexGridParams,
    RhinestoneLayout, RhinestonePlacement, RhinestoneSettings,
};

fn layout() -> RhinestoneLayout {
    let region = FillRegion::rect(Bounds::new(0.0, 0.0, 20.0, 20.0));
    calculate_hexagonal_grid(&region, &RhinestoneSettings::default(), &HexGridParams::default(), &[])
        .unwrap()
}

#[test]
fn test_json_export_round_trip() {
    let layout = layout();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stones.json");
    export_to_file(&layout, &path, ExportFormat::Json).unwrap();

    let doc: ExportDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc.stone_count, layout.len());
    for (exported, placed) in doc.stones.iter().zip(layout.iter()) {
        assert_eq!(exported.x, placed.x);
        assert_eq!(exported.y, placed.y);
        assert_eq!(exported.size, placed.stone_size);
    }
    assert_eq!(doc.stones.first().map(|s| s.index), Some(1));
}

#[test]
fn test_csv_and_gds_line_counts() {
    let layout = layout();
    let dir = tempfile::tempdir().unwrap();
    for format in [ExportFormat::Csv, ExportFormat::Gds] {
        let path = dir.path().join(format!("stones.{}", format.extension()));
        export_to_file(&layout, &path, format).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let header_lines = if format == ExportFormat::Csv { 1 } else { 2 };
        assert_eq!(text.lines().count(), layout.len() + header_lines);
    }
}

#[test]
fn test_csv_and_gds_row_formats() {
    let layout = RhinestoneLayout::new(vec![
        RhinestonePlacement {
            x: 1.23456,
            y: 7.0,
            stone_size: "SS10".to_string(),
            rotation: 45.26,
            element_index: None,
            diameter: None,
        },
        RhinestonePlacement {
            x: 10.0,
            y: 2.5,
            stone_size: "SS20".to_string(),
            rotation: 0.0,
            element_index: Some(1),
            diameter: Some(4.567),
        },
    ]);
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("stones.csv");
    export_to_file(&layout, &csv_path, ExportFormat::Csv).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "Index,X,Y,Stone Size,Rotation");
    assert_eq!(rows[1], "1,1.235,7.000,SS10,45.3");
    assert_eq!(rows[2], "2,10.000,2.500,SS20,0.0");

    let gds_path = dir.path().join("stones.gds");
    export_to_file(&layout, &gds_path, ExportFormat::Gds).unwrap();
    let gds = fs::read_to_string(&gds_path).unwrap();
    let rows: Vec<&str> = gds.lines().collect();
    assert_eq!(rows[0], "# Rhinestone Placement Data (2 stones)");
    assert_eq!(rows[1], "# Format: X Y Size Rotation");
    // table diameter for SS10, then the explicit one
    assert_eq!(rows[2], "1.235 7.000 2.80 45.3");
    assert_eq!(rows[3], "10.000 2.500 4.57 0.0");
}
