#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_halt as _;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

#[rtic::app(
    device = rp2040_hal::pac,
    peripherals = true,
    dispatchers = [PIO1_IRQ_0, PIO1_IRQ_1]
)]
mod app {
    use cortex_m::prelude::*;
    use embedded_hal::digital::v2::InputPin;
    use fugit::ExtU32;
    use keyberon::{debounce::Debouncer, key_code::KbHidReport, matrix::Matrix};
    use rp2040_hal::{
        clocks::{init_clocks_and_plls, Clock},
        gpio::{bank0, DynPin, Pin, Pins, PullUpInput},
        pac::PIO0,
        pio::{PIOExt, SM0},
        timer::{Alarm, Alarm0, Alarm1, Timer},
        usb::UsbBus,
        Sio, Watchdog,
    };
    use smart_leds::{SmartLedsWrite, RGB8};
    use usb_device::{
        class_prelude::{UsbBusAllocator, UsbClass},
        device::UsbDevice,
        prelude::{UsbDeviceBuilder, UsbVidPid},
    };
    use ws2812_pio::Ws2812Direct as Ws2812Pio;

    use s1_nkro::{
        config::{self, COLS, LED_COUNT, ROWS},
        keyboard::Keyboard,
        layout::OsMode,
    };

    type OsSwitch = Pin<bank0::Gpio26, PullUpInput>;

    const CLOCK_FREQ_HZ: u32 = 12_000_000;

    static mut USB_BUS: Option<usb_device::bus::UsbBusAllocator<UsbBus>> = None;

    #[shared]
    struct Shared {
        usb_device: UsbDevice<'static, UsbBus>,
        usb_class: keyberon::hid::HidClass<'static, UsbBus, keyberon::keyboard::Keyboard<()>>,
        keyboard: Keyboard,
        timer: Timer,
    }

    #[local]
    struct Local {
        matrix: Matrix<DynPin, DynPin, COLS, ROWS>,
        debouncer: Debouncer<[[bool; COLS]; ROWS]>,
        scan_alarm: Alarm0,
        frame_alarm: Alarm1,
        os_switch: OsSwitch,
        leds: Ws2812Pio<PIO0, SM0, bank0::Gpio22>,
        frame: [RGB8; LED_COUNT],
        last_consumer: Option<u16>,
        watchdog: Watchdog,
    }

    #[init]
    fn init(c: init::Context) -> (Shared, Local, init::Monotonics) {
        // Soft-reset does not release the hardware spinlocks
        // Release them now to avoid a deadlock after watchdog reset
        unsafe {
            rp2040_hal::sio::spinlock_reset();
        }

        let mut resets = c.device.RESETS;
        let mut watchdog = Watchdog::new(c.device.WATCHDOG);

        // ---- get clocks ----
        let clocks = init_clocks_and_plls(
            CLOCK_FREQ_HZ,
            c.device.XOSC,
            c.device.CLOCKS,
            c.device.PLL_SYS,
            c.device.PLL_USB,
            &mut resets,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        // ---- get pins ----
        let sio = Sio::new(c.device.SIO);
        let pins = Pins::new(
            c.device.IO_BANK0,
            c.device.PADS_BANK0,
            sio.gpio_bank0,
            &mut resets,
        );

        // ---- key matrix ----
        let matrix = Matrix::new(
            [
                pins.gpio0.into_pull_up_input().into(),
                pins.gpio1.into_pull_up_input().into(),
                pins.gpio2.into_pull_up_input().into(),
                pins.gpio3.into_pull_up_input().into(),
                pins.gpio4.into_pull_up_input().into(),
                pins.gpio5.into_pull_up_input().into(),
                pins.gpio6.into_pull_up_input().into(),
                pins.gpio7.into_pull_up_input().into(),
                pins.gpio8.into_pull_up_input().into(),
                pins.gpio9.into_pull_up_input().into(),
                pins.gpio10.into_pull_up_input().into(),
                pins.gpio11.into_pull_up_input().into(),
                pins.gpio12.into_pull_up_input().into(),
                pins.gpio13.into_pull_up_input().into(),
                pins.gpio14.into_pull_up_input().into(),
                pins.gpio15.into_pull_up_input().into(),
            ],
            [
                pins.gpio16.into_push_pull_output().into(),
                pins.gpio17.into_push_pull_output().into(),
                pins.gpio18.into_push_pull_output().into(),
                pins.gpio19.into_push_pull_output().into(),
                pins.gpio20.into_push_pull_output().into(),
                pins.gpio21.into_push_pull_output().into(),
            ],
        )
        .unwrap();

        let debouncer = Debouncer::new(
            [[false; COLS]; ROWS],
            [[false; COLS]; ROWS],
            config::DEBOUNCE_SCANS,
        );

        // ---- mac/win switch ----
        let os_switch: OsSwitch = pins.gpio26.into_pull_up_input();
        let os = OsMode::from_switch(os_switch.is_high().unwrap());
        let keyboard = Keyboard::new(os);
        defmt::info!("starting in {} mode", os);

        // ---- create alarms ----
        let mut timer = Timer::new(c.device.TIMER, &mut resets);

        let mut scan_alarm = timer.alarm_0().unwrap();
        scan_alarm.enable_interrupt();

        let mut frame_alarm = timer.alarm_1().unwrap();
        frame_alarm.enable_interrupt();

        scan_alarm.schedule(config::SCAN_TIME_US.micros()).unwrap();
        frame_alarm.schedule(config::FRAME_TIME_US.micros()).unwrap();

        // ---- set up usb ----
        let usb_bus = UsbBusAllocator::new(UsbBus::new(
            c.device.USBCTRL_REGS,
            c.device.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut resets,
        ));
        unsafe {
            USB_BUS = Some(usb_bus);
        }
        let usb_class = keyberon::new_class(unsafe { USB_BUS.as_ref().unwrap() }, ());
        let usb_device = UsbDeviceBuilder::new(
            unsafe { USB_BUS.as_ref().unwrap() },
            UsbVidPid(0x16c0, 0x27db),
        )
        .manufacturer("Keychron")
        .product("S1 ANSI RGB")
        .serial_number("42")
        .build();

        // ---- set up per-key leds ----
        let (mut pio, sm0, _, _, _) = c.device.PIO0.split(&mut resets);
        let leds = Ws2812Pio::new(
            pins.gpio22.into_mode(),
            &mut pio,
            sm0,
            clocks.peripheral_clock.freq(),
        );

        // ---- start watchdog ----
        watchdog.start(config::WATCHDOG_MS.millis());

        (
            Shared {
                usb_device,
                usb_class,
                keyboard,
                timer,
            },
            Local {
                matrix,
                debouncer,
                scan_alarm,
                frame_alarm,
                os_switch,
                leds,
                frame: [RGB8::default(); LED_COUNT],
                last_consumer: None,
                watchdog,
            },
            init::Monotonics(),
        )
    }

    /* ---------------------------------- keys ---------------------------------- */
    #[task(
        binds = TIMER_IRQ_0,
        priority = 1,
        shared = [keyboard],
        local = [matrix, debouncer, scan_alarm, os_switch, watchdog],
    )]
    fn scan(mut c: scan::Context) {
        // schedule the next scan
        let scan_alarm = c.local.scan_alarm;
        scan_alarm.clear_interrupt();
        scan_alarm.schedule(config::SCAN_TIME_US.micros()).unwrap();

        // feed watchdog so it knows this did not freeze
        c.local.watchdog.feed();

        let keys_pressed = c.local.matrix.get().unwrap();
        let events = c.local.debouncer.events(keys_pressed);
        let os = OsMode::from_switch(c.local.os_switch.is_high().unwrap());

        c.shared.keyboard.lock(|k| {
            k.set_os(os);
            for event in events {
                k.event(event)
            }
        });

        handle_events::spawn().unwrap();
    }

    #[task(priority = 2, capacity = 8, shared = [usb_class, keyboard, timer], local = [last_consumer])]
    fn handle_events(mut c: handle_events::Context) {
        let now = c.shared.timer.lock(|t| t.get_counter());

        let (report, consumer): (KbHidReport, _) = c
            .shared
            .keyboard
            .lock(|k| (k.tick(now), k.consumer_usage()));

        // the boot keyboard interface carries no consumer page
        if consumer != *c.local.last_consumer {
            if let Some(usage) = consumer {
                defmt::warn!("consumer usage {=u16:#x} dropped", usage);
            }
            *c.local.last_consumer = consumer;
        }

        // send usb keyboard report
        if c.shared
            .usb_class
            .lock(|k| k.device_mut().set_keyboard_report(report.clone()))
        {
            while let Ok(0) = c.shared.usb_class.lock(|k| k.write(report.as_bytes())) {}
        }
    }

    #[task(binds = USBCTRL_IRQ, priority = 3, shared = [usb_device, usb_class])]
    fn usb_rx(c: usb_rx::Context) {
        let mut usb_d = c.shared.usb_device;
        let mut usb_c = c.shared.usb_class;
        usb_d.lock(|d| {
            usb_c.lock(|c| {
                if d.poll(&mut [c]) {
                    c.poll();
                }
            })
        });
    }

    /* ---------------------------------- leds ---------------------------------- */
    #[task(
        binds = TIMER_IRQ_1,
        priority = 1,
        shared = [keyboard, timer],
        local = [frame_alarm, leds, frame],
    )]
    fn render(mut c: render::Context) {
        let frame_alarm = c.local.frame_alarm;
        frame_alarm.clear_interrupt();
        frame_alarm.schedule(config::FRAME_TIME_US.micros()).unwrap();

        let now = c.shared.timer.lock(|t| t.get_counter());
        let frame = c.local.frame;
        c.shared.keyboard.lock(|k| k.render(now, frame));
        c.local.leds.write(frame.iter().copied()).unwrap();
    }
}
