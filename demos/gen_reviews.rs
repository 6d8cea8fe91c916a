use anyhow::Result;

fn main() -> Result<()> {
    let mut book = umya_spreadsheet::new_file();

    let sheet = book.get_active_sheet_mut();

    // Row 1 is text too, so it also gets a label in column B.
    sheet.get_cell_mut("A1").set_value("Review");

    let reviews = [
        "The room was spotless and the staff were lovely.",
        "Breakfast was cold. The coffee was fine though.",
        "Average stay, nothing special.",
    ];
    for (i, review) in reviews.iter().enumerate() {
        let addr = format!("A{}", i + 2);
        sheet.get_cell_mut(addr.as_str()).set_value(*review);
    }

    umya_spreadsheet::writer::xlsx::write(&book, "reviews.xlsx")?;
    println!("Wrote reviews.xlsx");
    Ok(())
}
