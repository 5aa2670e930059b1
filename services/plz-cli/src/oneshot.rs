use plz_lookup::{AddressDirectory, AddressLookupController};

/// Waits for the pending lookup to finish and prints the form state as JSON.
pub(crate) async fn print_settled<D>(controller: &AddressLookupController<D>)
where
    D: AddressDirectory + 'static,
{
    let state = controller.settled().await;
    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("form state unavailable: {}", err),
    }
}
