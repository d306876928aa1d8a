use muster_core::{
    parse_roster_csv, AttendanceRepository, CsvError, RosterRow, SqliteAttendanceRepository,
};

#[test]
fn parses_portuguese_crew_export() {
    let csv = "\u{feff}nome,nome_guerra,matricula,baleeira,empresa,camarote,leito\r\n\
               Ana Silva,Aninha,M001,b3,Petro,201,A\r\n\
               Bruno Dias,,M002,B3,Offshore Ltda,202,B\r\n";

    let rows = parse_roster_csv(csv).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name.as_deref(), Some("Ana Silva"));
    assert_eq!(rows[0].nickname.as_deref(), Some("Aninha"));
    assert_eq!(rows[0].registration.as_deref(), Some("M001"));
    assert_eq!(rows[0].lifeboat.as_deref(), Some("b3"));
    assert_eq!(rows[0].cabin.as_deref(), Some("201"));
    assert_eq!(rows[0].bunk.as_deref(), Some("A"));
    assert_eq!(rows[1].nickname, None);
    assert_eq!(rows[1].company.as_deref(), Some("Offshore Ltda"));
}

#[test]
fn locates_columns_by_header_in_any_order() {
    let csv = "Lifeboat,Company,Name\nB1,ACME,Ana\n";
    let rows = parse_roster_csv(csv).unwrap();
    assert_eq!(
        rows,
        vec![RosterRow::new("Ana", "B1").with_company("ACME")]
    );
}

#[test]
fn accepts_semicolon_delimiter_and_quoted_fields() {
    let csv = "nome;baleeira;empresa\n\"Silva; Ana\";B2;\"Empresa \"\"X\"\"\"\n";
    let rows = parse_roster_csv(csv).unwrap();
    assert_eq!(rows[0].name.as_deref(), Some("Silva; Ana"));
    assert_eq!(rows[0].company.as_deref(), Some("Empresa \"X\""));
}

#[test]
fn blank_lines_are_skipped_and_short_rows_keep_missing_fields() {
    let csv = "name,nickname,lifeboat\n\nAna,Aninha\n   \nCaio,,B1\n";
    let rows = parse_roster_csv(csv).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].lifeboat, None);
    assert_eq!(rows[1].lifeboat.as_deref(), Some("B1"));
}

#[test]
fn rejects_empty_input_and_missing_required_columns() {
    assert_eq!(parse_roster_csv("").unwrap_err(), CsvError::EmptyInput);
    assert_eq!(parse_roster_csv("\n  \n").unwrap_err(), CsvError::EmptyInput);
    assert_eq!(
        parse_roster_csv("nome,empresa\nAna,X\n").unwrap_err(),
        CsvError::MissingColumn("lifeboat")
    );
    assert_eq!(
        parse_roster_csv("baleeira\nB1\n").unwrap_err(),
        CsvError::MissingColumn("name")
    );
}

#[test]
fn reports_line_of_unterminated_quote() {
    let err = parse_roster_csv("name,lifeboat\nAna,B1\n\"Caio,B2\n").unwrap_err();
    assert_eq!(err, CsvError::UnterminatedQuote { line: 3 });
}

#[test]
fn parsed_rows_import_with_invalid_rows_skipped() {
    let csv = "name,lifeboat\nAna,b1\n,B1\nCaio,\nDuda,B2\n";
    let rows = parse_roster_csv(csv).unwrap();
    assert_eq!(rows.len(), 4);

    let repo = SqliteAttendanceRepository::open_in_memory().unwrap();
    let event_id = repo.create_event().unwrap();
    let report = repo.import_roster(event_id, &rows).unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(repo.compute_summary(event_id).unwrap().total_headcount, 2);
}
