//! Example: LE Scanning
//!
//! Registers two scanners on hci0, lets both scan for a while and prints every
//! advertising report they receive. Needs CAP_NET_RAW.

use blescan::scanner::{HciControllerConfig, HciScannerController, ScanMode};
use blescan::{ScanDelegate, ScanResult, ScanSettings, Scanner, ScannerHandle, ScannerRegistry, Uuid};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Printer;

impl ScanDelegate for Printer {
    fn on_scan_result(&self, scanner: ScannerHandle, result: &ScanResult) {
        println!(
            "[scanner {}] {} RSSI {} dBm",
            scanner,
            result.device_address(),
            result.rssi()
        );
        for (ad_type, value) in result.advertising_structures() {
            println!("    AD 0x{:02X}: {}", ad_type, hex::encode(value));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    println!("Opening HCI device 0...");
    let controller = Arc::new(HciScannerController::open(HciControllerConfig {
        filter_duplicates: true,
        ..Default::default()
    })?);

    let registry = ScannerRegistry::new(controller.clone(), Arc::new(AtomicBool::new(true)));

    let scanners: Arc<Mutex<Vec<Scanner>>> = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..2 {
        let scanners = scanners.clone();
        registry.register_instance(Uuid::new_random_v4(), move |app_uuid, result| match result {
            Ok(scanner) => {
                println!("Registered scanner {} for {}", scanner.handle(), app_uuid);
                scanners.lock().unwrap().push(scanner);
            }
            Err(e) => eprintln!("Registration for {} failed: {}", app_uuid, e),
        })?;
    }
    controller.process_events(&registry, Duration::from_millis(100))?;

    let printer = Arc::new(Printer);
    let settings = ScanSettings {
        mode: ScanMode::Balanced,
        ..Default::default()
    };
    for scanner in scanners.lock().unwrap().iter() {
        scanner.set_delegate(&printer);
        scanner.start_scan(&settings, &[])?;
    }

    println!("\nScanning for 10 seconds...");
    let start_time = Instant::now();
    while start_time.elapsed() < Duration::from_secs(10) {
        controller.process_events(&registry, Duration::from_millis(500))?;
    }

    // Dropping the scanners stops the scan and unregisters them
    scanners.lock().unwrap().clear();
    println!("Stopped scanning");

    Ok(())
}
