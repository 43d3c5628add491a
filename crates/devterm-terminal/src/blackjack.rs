//! Blackjack rules: deck, hand scoring, and one round of play.

use std::fmt;

use crate::rng::SimpleRng;

/// Starting balance when nothing is stored.
pub const STARTING_BALANCE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    fn symbol(self) -> char {
        match self {
            Self::Spades => '♠',
            Self::Hearts => '♥',
            Self::Diamonds => '♦',
            Self::Clubs => '♣',
        }
    }
}

/// A playing card; `rank` is 1 (ace) through 13 (king).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Self {
        Self { rank, suit }
    }

    fn is_ace(self) -> bool {
        self.rank == 1
    }

    /// Points before ace adjustment: ace 11, faces 10.
    fn points(self) -> u32 {
        match self.rank {
            1 => 11,
            11..=13 => 10,
            n => u32::from(n),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        };
        write!(f, "{label}{}", self.suit.symbol())
    }
}

/// A full 52-card deck in random order.
pub fn shuffled_deck(rng: &mut SimpleRng) -> Vec<Card> {
    let mut deck: Vec<Card> = Suit::ALL
        .into_iter()
        .flat_map(|suit| (1..=13).map(move |rank| Card::new(rank, suit)))
        .collect();
    rng.shuffle(&mut deck);
    deck
}

/// Best total of a hand: aces count 11 and drop to 1 while the hand busts.
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut total: u32 = hand.iter().map(|c| c.points()).sum();
    let mut aces = hand.iter().filter(|c| c.is_ace()).count();
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    total
}

/// Cards separated by spaces.
pub fn show_hand(hand: &[Card]) -> String {
    hand.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Push,
    Lose,
}

impl Outcome {
    /// Amount returned to the player for a settled `bet`.
    pub fn payout(self, bet: u64) -> u64 {
        match self {
            Self::Win => bet * 2,
            Self::Push => bet,
            Self::Lose => 0,
        }
    }
}

/// One hand in progress. The bet has already left the balance.
#[derive(Debug, Clone)]
pub struct Round {
    deck: Vec<Card>,
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
    pub bet: u64,
}

impl Round {
    /// Shuffle and deal two cards each.
    pub fn deal(bet: u64, rng: &mut SimpleRng) -> Self {
        Self::from_deck(bet, shuffled_deck(rng))
    }

    /// Deal from a fixed deck; cards are drawn from the end.
    pub fn from_deck(bet: u64, deck: Vec<Card>) -> Self {
        let mut round = Self {
            deck,
            player: Vec::new(),
            dealer: Vec::new(),
            bet,
        };
        for _ in 0..2 {
            if let Some(c) = round.draw() {
                round.player.push(c);
            }
        }
        for _ in 0..2 {
            if let Some(c) = round.draw() {
                round.dealer.push(c);
            }
        }
        round
    }

    fn draw(&mut self) -> Option<Card> {
        let card = self.deck.pop();
        if card.is_none() {
            log::warn!("blackjack deck exhausted");
        }
        card
    }

    pub fn player_value(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_value(&self) -> u32 {
        hand_value(&self.dealer)
    }

    pub fn is_bust(&self) -> bool {
        self.player_value() > 21
    }

    /// Give the player one more card.
    pub fn hit(&mut self) -> Option<Card> {
        let card = self.draw()?;
        self.player.push(card);
        Some(card)
    }

    /// Dealer draws until reaching 17.
    pub fn play_dealer(&mut self) {
        while self.dealer_value() < 17 {
            match self.draw() {
                Some(c) => self.dealer.push(c),
                None => break,
            }
        }
    }

    /// Compare the hands as they stand.
    pub fn settle(&self) -> Outcome {
        let player = self.player_value();
        let dealer = self.dealer_value();
        if player > 21 {
            Outcome::Lose
        } else if dealer > 21 || player > dealer {
            Outcome::Win
        } else if player == dealer {
            Outcome::Push
        } else {
            Outcome::Lose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(rank: u8) -> Card {
        Card::new(rank, Suit::Spades)
    }

    #[test]
    fn deck_has_52_distinct_cards() {
        let mut rng = SimpleRng::new(3);
        let deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), 52);
        for (i, a) in deck.iter().enumerate() {
            assert!(!deck[i + 1..].contains(a));
        }
    }

    #[test]
    fn aces_soften_when_busting() {
        assert_eq!(hand_value(&[c(1), c(13)]), 21);
        assert_eq!(hand_value(&[c(1), c(1)]), 12);
        assert_eq!(hand_value(&[c(1), c(9), c(5)]), 15);
        assert_eq!(hand_value(&[c(10), c(12), c(2)]), 22);
    }

    #[test]
    fn card_display() {
        assert_eq!(Card::new(1, Suit::Hearts).to_string(), "A♥");
        assert_eq!(Card::new(10, Suit::Clubs).to_string(), "10♣");
        assert_eq!(show_hand(&[Card::new(12, Suit::Diamonds), c(7)]), "Q♦ 7♠");
    }

    #[test]
    fn deal_draws_from_end() {
        // player gets 10, 9; dealer gets 8, 7; next hit is 2
        let deck = vec![c(2), c(7), c(8), c(9), c(10)];
        let mut round = Round::from_deck(50, deck);
        assert_eq!(round.player_value(), 19);
        assert_eq!(round.dealer_value(), 15);
        assert_eq!(round.hit(), Some(c(2)));
        assert_eq!(round.player_value(), 21);
        assert_eq!(round.hit(), None);
    }

    #[test]
    fn dealer_stops_at_17() {
        let deck = vec![c(9), c(2), c(5), c(10), c(10), c(10)];
        let mut round = Round::from_deck(10, deck);
        // dealer: 10 + 5 = 15, draws 2 -> 17 and stops
        round.play_dealer();
        assert_eq!(round.dealer_value(), 17);
        assert_eq!(round.settle(), Outcome::Win);
    }

    #[test]
    fn settle_outcomes_and_payouts() {
        let push = Round::from_deck(10, vec![c(10), c(8), c(10), c(8)]);
        assert_eq!(push.settle(), Outcome::Push);
        let lose = Round::from_deck(10, vec![c(10), c(9), c(10), c(7)]);
        assert_eq!(lose.settle(), Outcome::Lose);
        assert_eq!(Outcome::Win.payout(25), 50);
        assert_eq!(Outcome::Push.payout(25), 25);
        assert_eq!(Outcome::Lose.payout(25), 0);
    }

    #[test]
    fn bust_always_loses() {
        let mut round = Round::from_deck(10, vec![c(13), c(5), c(12), c(10), c(10)]);
        round.dealer.push(c(10));
        round.hit();
        assert!(round.is_bust());
        assert_eq!(round.settle(), Outcome::Lose);
    }
}
